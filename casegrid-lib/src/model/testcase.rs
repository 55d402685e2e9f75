//! Test case records as served by the test-management backend.

use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::bulk::BulkAction;
use crate::grid::Column;

use super::Row;

/// Lifecycle status of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCaseStatus {
    Draft,
    Active,
    Blocked,
    Deprecated,
}

impl TestCaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Deprecated => "deprecated",
        }
    }
}

impl fmt::Display for TestCaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCasePriority {
    Low,
    Medium,
    High,
    Critical,
}

impl TestCasePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for TestCasePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCaseType {
    Functional,
    Performance,
    Security,
    Regression,
    Manual,
    Automated,
}

impl TestCaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Functional => "functional",
            Self::Performance => "performance",
            Self::Security => "security",
            Self::Regression => "regression",
            Self::Manual => "manual",
            Self::Automated => "automated",
        }
    }
}

impl fmt::Display for TestCaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TestCaseStatus,
    pub priority: TestCasePriority,
    #[serde(rename = "type")]
    pub kind: TestCaseType,
    #[serde(default)]
    pub preconditions: Option<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub expected_results: Vec<String>,
    /// Minutes.
    #[serde(default)]
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_by: Option<i64>,
}

impl Row for TestCase {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

impl TestCase {
    /// The column set of the test case list.
    ///
    /// Tags are a display-only column; the backend neither sorts nor
    /// filters on them.
    pub fn default_columns() -> Vec<Column<TestCase>> {
        vec![
            Column::new("title", "Title", 300, |tc: &TestCase| tc.title.clone())
                .sortable(true)
                .filterable(true),
            Column::new("status", "Status", 100, |tc: &TestCase| tc.status.to_string())
                .sortable(true)
                .filterable(true),
            Column::new("priority", "Priority", 100, |tc: &TestCase| {
                tc.priority.to_string()
            })
            .sortable(true)
            .filterable(true),
            Column::new("type", "Type", 100, |tc: &TestCase| tc.kind.to_string())
                .sortable(true)
                .filterable(true),
            Column::new("tags", "Tags", 150, |tc: &TestCase| tc.tags.join(", ")),
            Column::new("created_at", "Created", 150, |tc: &TestCase| {
                tc.created_at.format("%Y-%m-%d %H:%M").to_string()
            })
            .sortable(true),
        ]
    }
}

/// Bulk actions offered on the test case list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestCaseAction {
    Activate,
    Block,
    Deprecate,
    MarkDraft,
    Delete,
}

impl TestCaseAction {
    /// Target status for status-changing actions.
    pub fn target_status(&self) -> Option<TestCaseStatus> {
        match self {
            Self::Activate => Some(TestCaseStatus::Active),
            Self::Block => Some(TestCaseStatus::Blocked),
            Self::Deprecate => Some(TestCaseStatus::Deprecated),
            Self::MarkDraft => Some(TestCaseStatus::Draft),
            Self::Delete => None,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "activate" => Some(Self::Activate),
            "block" => Some(Self::Block),
            "deprecate" => Some(Self::Deprecate),
            "draft" | "mark-draft" | "mark_draft" => Some(Self::MarkDraft),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl From<TestCaseAction> for BulkAction {
    fn from(action: TestCaseAction) -> Self {
        match action.target_status() {
            Some(status) => BulkAction::new("set_status")
                .with_param("status", status.as_str()),
            None => BulkAction::new("delete"),
        }
    }
}
