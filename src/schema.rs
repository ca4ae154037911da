use chrono::NaiveDate;

use crate::model::{ProjectStatus, TaskPriority};

// Form body for the token endpoint; the identifier goes in `username`
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct LoginSchema {
    pub username: String,
    pub password: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RegisterSchema {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

// Struct representing the request body for creating a new Project
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CreateProjectSchema {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Partial update for a project. Only fields set to `Some` are sent; a nullable
/// field set to `Some(None)` is sent as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct UpdateProjectSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<NaiveDate>>,
}

impl UpdateProjectSchema {
    pub fn status(status: ProjectStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

// Struct representing the request body for creating a new Task
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CreateTaskSchema {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub project_id: Option<i64>,
}

/// Partial update for a task, with the same `Option<Option<_>>` convention as
/// [`UpdateProjectSchema`].
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct UpdateTaskSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<i64>>,
}

impl UpdateTaskSchema {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn partial_update_sends_only_supplied_fields() {
        let body = serde_json::to_value(UpdateProjectSchema::status(ProjectStatus::Done)).unwrap();
        assert_eq!(body, json!({"status": "Done"}));
    }

    #[test]
    fn explicit_null_clears_a_field() {
        let update = UpdateTaskSchema {
            project_id: Some(None),
            due_date: Some(NaiveDate::from_ymd_opt(2024, 5, 1)),
            ..UpdateTaskSchema::default()
        };
        let body = serde_json::to_value(update).unwrap();
        assert_eq!(body, json!({"project_id": null, "due_date": "2024-05-01"}));
    }

    #[test]
    fn empty_update_is_an_empty_object() {
        let body = serde_json::to_value(UpdateTaskSchema::default()).unwrap();
        assert_eq!(body, json!({}));
    }

    #[test]
    fn new_task_carries_nullable_project() {
        let body = serde_json::to_value(CreateTaskSchema {
            title: "Write docs".to_string(),
            ..CreateTaskSchema::default()
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "title": "Write docs",
                "completed": false,
                "priority": "Medium",
                "due_date": null,
                "project_id": null
            })
        );
    }
}
