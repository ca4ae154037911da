use crate::{client::HttpClient, error::ApiError, schema::HealthStatus};

pub struct HealthApi<'a> {
    client: &'a HttpClient,
}

impl<'a> HealthApi<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    pub async fn check(&self) -> Result<HealthStatus, ApiError> {
        self.client.get_json("/health").await
    }
}
