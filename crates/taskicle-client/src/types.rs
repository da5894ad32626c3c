use serde::{Deserialize, Serialize};
use taskicle_core::{StatusDescriptor, StatusKind, lookup};

/// Largest page the backend will return
pub const MAX_PAGE_SIZE: u32 = 50;

// -- Envelope --

/// Raw response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub r: taskicle_core::ApiResultCode,
    #[serde(default)]
    pub r2: i64,
    #[serde(default)]
    pub err_msg: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

// -- Paging --

/// Page selector for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index
    pub page: u32,
    /// Entries per page, clamped to `1..=50`
    pub count: u32,
}

impl PageRequest {
    pub fn new(page: u32, count: u32) -> Self {
        Self {
            page,
            count: count.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub(crate) fn query(self) -> [(&'static str, String); 2] {
        [("count", self.count.to_string()), ("page", self.page.to_string())]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, MAX_PAGE_SIZE)
    }
}

// -- Projects --

/// Project as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: i64,
    pub project_name: String,
    /// Creation time, milliseconds since the Unix epoch
    #[serde(default)]
    pub create_at: i64,
}

// -- Tasks --

/// Task as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: i64,
    #[serde(default)]
    pub task_name: String,
    /// Raw task state, see [`taskicle_core::TaskState`]
    pub status: i64,
    /// Raw priority, see [`taskicle_core::PriorityLevel`]
    pub priority: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub create_at: i64,
    #[serde(default)]
    pub update_at: i64,
    /// Deadline in milliseconds, 0 when unset
    #[serde(default)]
    pub expire_at: i64,
    #[serde(default)]
    pub assignee_id: i64,
    #[serde(default)]
    pub creator_id: i64,
}

impl Task {
    /// Badge for this task's priority
    pub fn priority_badge(&self) -> StatusDescriptor {
        lookup(StatusKind::Priority, self.priority)
    }

    /// Badge for this task's state
    pub fn state_badge(&self) -> StatusDescriptor {
        lookup(StatusKind::State, self.status)
    }
}

/// Fields for creating a task; unset fields take backend defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub project_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
}

/// Partial update of a task; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskUpdate {
    pub task_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
}

impl TaskUpdate {
    /// Whether anything besides the id would be sent
    pub const fn is_empty(&self) -> bool {
        self.task_name.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.description.is_none()
            && self.expire_at.is_none()
            && self.assignee_id.is_none()
    }
}

/// Comment on a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskComment {
    pub comm_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub create_at: i64,
    /// Edited after posting
    #[serde(default)]
    pub modified: bool,
}

// -- Articles --

/// Group of article pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGroup {
    pub page_group_id: i64,
    pub group_name: String,
    #[serde(default)]
    pub create_at: i64,
}

/// Article page as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page_id: i64,
    pub page_name: String,
    #[serde(default)]
    pub create_at: i64,
    /// An unsaved draft exists next to the latest version
    #[serde(default)]
    pub has_draft: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageCreated {
    pub page_id: i64,
}

/// Saved version of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageVersion {
    pub ver_id: i64,
    pub user_id: i64,
    /// Creation time, seconds since the Unix epoch
    #[serde(default)]
    pub create_at: i64,
    #[serde(default)]
    pub description: String,
}

// -- Users --

/// Role reported on login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum UserRole {
    Normal,
    Admin,
    /// Role not known to this client
    Other(i64),
}

impl From<i64> for UserRole {
    fn from(value: i64) -> Self {
        match value {
            1 => Self::Normal,
            2 => Self::Admin,
            other => Self::Other(other),
        }
    }
}

impl From<UserRole> for i64 {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Normal => 1,
            UserRole::Admin => 2,
            UserRole::Other(value) => value,
        }
    }
}

/// Data returned by a successful login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginInfo {
    pub role: UserRole,
}
