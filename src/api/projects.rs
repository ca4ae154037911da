use crate::{
    client::HttpClient,
    error::ApiError,
    model::{Project, ProjectStatus},
    schema::{CreateProjectSchema, UpdateProjectSchema},
};

pub struct ProjectsApi<'a> {
    client: &'a HttpClient,
}

impl<'a> ProjectsApi<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    // Fetch all projects of the signed-in user
    pub async fn list(&self) -> Result<Vec<Project>, ApiError> {
        self.client.get_json("/projects").await
    }

    pub async fn get(&self, id: i64) -> Result<Project, ApiError> {
        self.client.get_json(&format!("/projects/{id}")).await
    }

    pub async fn create(&self, project: &CreateProjectSchema) -> Result<Project, ApiError> {
        self.client.post_json("/projects", project).await
    }

    /// Partial update: only the fields set in `fields` change server-side.
    pub async fn update(&self, id: i64, fields: &UpdateProjectSchema) -> Result<Project, ApiError> {
        self.client
            .put_json(&format!("/projects/{id}"), fields)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/projects/{id}")).await
    }

    pub async fn set_status(&self, id: i64, status: ProjectStatus) -> Result<Project, ApiError> {
        self.update(id, &UpdateProjectSchema::status(status)).await
    }

    // Projects whose status is anything but Done
    pub async fn list_active(&self) -> Result<Vec<Project>, ApiError> {
        let mut projects = self.list().await?;
        projects.retain(|p| !p.is_archived());
        Ok(projects)
    }

    pub async fn list_archived(&self) -> Result<Vec<Project>, ApiError> {
        let mut projects = self.list().await?;
        projects.retain(Project::is_archived);
        Ok(projects)
    }
}
