use crate::{
    client::HttpClient,
    error::ApiError,
    model::Task,
    schema::{CreateTaskSchema, UpdateTaskSchema},
};

pub struct TasksApi<'a> {
    client: &'a HttpClient,
}

impl<'a> TasksApi<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Task>, ApiError> {
        self.client.get_json("/tasks").await
    }

    pub async fn get(&self, id: i64) -> Result<Task, ApiError> {
        self.client.get_json(&format!("/tasks/{id}")).await
    }

    pub async fn create(&self, task: &CreateTaskSchema) -> Result<Task, ApiError> {
        self.client.post_json("/tasks", task).await
    }

    pub async fn update(&self, id: i64, fields: &UpdateTaskSchema) -> Result<Task, ApiError> {
        self.client.put_json(&format!("/tasks/{id}"), fields).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/tasks/{id}")).await
    }

    // Toggle used by the task list's checkbox
    pub async fn set_completed(&self, id: i64, completed: bool) -> Result<Task, ApiError> {
        self.update(id, &UpdateTaskSchema::completed(completed)).await
    }
}
