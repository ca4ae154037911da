//! Typed wrappers over the TaskFlow endpoints.
//!
//! Each API borrows the shared [`HttpClient`](crate::client::HttpClient) and
//! holds no state of its own.

mod auth;
mod health;
mod projects;
mod tasks;

pub use auth::AuthApi;
pub use health::HealthApi;
pub use projects::ProjectsApi;
pub use tasks::TasksApi;
