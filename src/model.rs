use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// Lifecycle of a project; `Done` doubles as the archive marker.
// The server stores status as free text, so unknown labels are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProjectStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Other(String),
}

// Data model representing a Project as returned by the server
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

// Data model representing a Task as returned by the server
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub project_id: Option<i64>,
}

/// Colour family a badge is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeVariant {
    Primary,
    Secondary,
    Success,
    Warning,
    Danger,
}

impl BadgeVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeVariant::Primary => "primary",
            BadgeVariant::Secondary => "secondary",
            BadgeVariant::Success => "success",
            BadgeVariant::Warning => "warning",
            BadgeVariant::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge<'a> {
    pub label: &'a str,
    pub variant: BadgeVariant,
}

impl ProjectStatus {
    /// Maps a wire label onto a status; anything unrecognised becomes `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Not Started" => ProjectStatus::NotStarted,
            "In Progress" => ProjectStatus::InProgress,
            "Done" => ProjectStatus::Done,
            other => ProjectStatus::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ProjectStatus::NotStarted => "Not Started",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Done => "Done",
            ProjectStatus::Other(label) => label,
        }
    }

    pub fn badge(&self) -> Badge<'_> {
        let variant = match self {
            ProjectStatus::NotStarted | ProjectStatus::Other(_) => BadgeVariant::Secondary,
            ProjectStatus::InProgress => BadgeVariant::Primary,
            ProjectStatus::Done => BadgeVariant::Success,
        };
        Badge {
            label: self.label(),
            variant,
        }
    }
}

impl TaskPriority {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Low" => TaskPriority::Low,
            "Medium" => TaskPriority::Medium,
            "High" => TaskPriority::High,
            other => TaskPriority::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
            TaskPriority::Other(label) => label,
        }
    }

    pub fn badge(&self) -> Badge<'_> {
        let variant = match self {
            TaskPriority::Low | TaskPriority::Other(_) => BadgeVariant::Secondary,
            TaskPriority::Medium => BadgeVariant::Warning,
            TaskPriority::High => BadgeVariant::Danger,
        };
        Badge {
            label: self.label(),
            variant,
        }
    }
}

// Both enums travel as their label; `null` reads as the default
impl Serialize for ProjectStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ProjectStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.map(|l| Self::from_label(&l)).unwrap_or_default())
    }
}

impl Serialize for TaskPriority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for TaskPriority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.map(|l| Self::from_label(&l)).unwrap_or_default())
    }
}

// Parses command-line input: only the known statuses, loosely spelled
impl FromStr for ProjectStatus {
    type Err = String;

    // Accepts the wire labels as well as compact forms like `in-progress`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "notstarted" => Ok(ProjectStatus::NotStarted),
            "inprogress" => Ok(ProjectStatus::InProgress),
            "done" => Ok(ProjectStatus::Done),
            _ => Err(format!("unknown project status {s:?}")),
        }
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(format!("unknown task priority {s:?}")),
        }
    }
}

impl Project {
    pub fn is_archived(&self) -> bool {
        self.status == ProjectStatus::Done
    }
}

impl Task {
    pub fn status_badge(&self) -> Badge<'static> {
        if self.completed {
            Badge {
                label: "Done",
                variant: BadgeVariant::Success,
            }
        } else {
            Badge {
                label: "In Progress",
                variant: BadgeVariant::Primary,
            }
        }
    }
}

/// Projects still being worked on (anything not `Done`).
pub fn active_projects(projects: &[Project]) -> Vec<&Project> {
    projects.iter().filter(|p| !p.is_archived()).collect()
}

pub fn archived_projects(projects: &[Project]) -> Vec<&Project> {
    projects.iter().filter(|p| p.is_archived()).collect()
}
