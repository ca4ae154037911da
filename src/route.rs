use std::{fmt, sync::Mutex};

use tracing::debug;

pub const LOGIN_PATH: &str = "/login";

// Client-side routes a view layer can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Projects,
    NewProject,
    EditProject(i64),
    ArchivedProjects,
    Tasks,
    NewTask,
    EditTask(i64),
}

impl Route {
    /// Parses a path; `None` for anything that is not a known route.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').skip(1).collect();
        let route = match segments.as_slice() {
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["projects"] => Route::Projects,
            ["projects", "new"] => Route::NewProject,
            ["projects", "archived"] => Route::ArchivedProjects,
            ["projects", "edit", id] => Route::EditProject(id.parse().ok()?),
            ["tasks"] => Route::Tasks,
            ["tasks", "new"] => Route::NewTask,
            ["tasks", "edit", id] => Route::EditTask(id.parse().ok()?),
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => LOGIN_PATH.to_string(),
            Route::Register => "/register".to_string(),
            Route::Projects => "/projects".to_string(),
            Route::NewProject => "/projects/new".to_string(),
            Route::EditProject(id) => format!("/projects/edit/{id}"),
            Route::ArchivedProjects => "/projects/archived".to_string(),
            Route::Tasks => "/tasks".to_string(),
            Route::NewTask => "/tasks/new".to_string(),
            Route::EditTask(id) => format!("/tasks/edit/{id}"),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    /// Applies the authentication guard to a requested path.
    ///
    /// Signed-in users are sent away from the login and register pages;
    /// anonymous users only ever reach them.
    pub fn resolve(path: &str, authenticated: bool) -> Route {
        match (Route::parse(path), authenticated) {
            (Some(route), true) if route.is_public() => Route::Projects,
            (Some(route), true) => route,
            (Some(route), false) if route.is_public() => route,
            (_, false) => Route::Login,
            (None, true) => Route::Projects,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where the view layer currently is, and how to move it.
pub trait Navigator: Send + Sync {
    fn current(&self) -> String;
    fn navigate(&self, path: &str);
}

/// In-memory navigator that keeps every visited path.
#[derive(Debug)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(vec![start.into()]),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Number of navigations since the starting path.
    pub fn navigations(&self) -> usize {
        self.lock().len() - 1
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for History {
    fn current(&self) -> String {
        self.lock().last().cloned().unwrap_or_default()
    }

    fn navigate(&self, path: &str) {
        debug!(path, "Navigating");
        self.lock().push(path.to_string());
    }
}
