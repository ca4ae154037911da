//! Client for the TaskFlow project and task API.
//!
//! The pieces, leaf first:
//! - [`session::SessionStore`] holds the bearer token and persists it through a
//!   [`storage::TokenStorage`].
//! - [`client::HttpClient`] sends every call through request and response
//!   [`middleware`]: the token is attached on the way out, and a 401 on the way
//!   back clears the session and redirects the [`route::Navigator`] to login.
//! - [`api`] maps auth, project and task operations onto endpoints.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use taskflow_client::{config::Config, route::History, AppState};
//!
//! let app = AppState::open(Config::load()?, Arc::new(History::new("/login"))).await?;
//! app.auth().sign_in("a@b.com", "pw", &app.session).await?;
//! for project in app.projects().list_active().await? {
//!     println!("{} [{}]", project.name, project.status.label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod model;
pub mod route;
pub mod schema;
pub mod session;
pub mod storage;

use std::sync::Arc;

use api::{AuthApi, HealthApi, ProjectsApi, TasksApi};
use client::HttpClient;
use config::Config;
use error::StorageError;
use route::Navigator;
use session::SessionStore;
use storage::SqliteStorage;

// Struct representing the client application state
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub client: HttpClient,
}

impl AppState {
    /// Opens the durable session named by `config` and builds the client around it.
    pub async fn open(config: Config, navigator: Arc<dyn Navigator>) -> Result<Self, StorageError> {
        let storage = SqliteStorage::open(&config.session_db).await?;
        let session = Arc::new(SessionStore::open(Arc::new(storage)).await);
        Ok(Self::with_session(config, session, navigator))
    }

    pub fn with_session(
        config: Config,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let client = HttpClient::from_config(&config, Arc::clone(&session), navigator);
        Self {
            config,
            session,
            client,
        }
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.client)
    }

    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(&self.client)
    }

    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi::new(&self.client)
    }

    pub fn health(&self) -> HealthApi<'_> {
        HealthApi::new(&self.client)
    }
}
