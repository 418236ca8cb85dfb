use std::fmt;

use serde::{Deserialize, Serialize};

/// The lifecycle status of a release.
///
/// The API reports statuses as `IN_PROGRESS`, `FAILED`, ... while the search
/// endpoint filters on `inProgress`, `failed`, ... Both spellings parse.
/// Anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReleaseStatus {
    Planned,
    Paused,
    InProgress,
    Completed,
    Aborted,
    Failed,
    Other(String),
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Planned => "planned",
            Self::Paused => "paused",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for ReleaseStatus {
    fn from(s: &str) -> Self {
        match s {
            "planned" | "PLANNED" => Self::Planned,
            "paused" | "PAUSED" => Self::Paused,
            "inProgress" | "IN_PROGRESS" => Self::InProgress,
            "completed" | "COMPLETED" => Self::Completed,
            "aborted" | "ABORTED" => Self::Aborted,
            "failed" | "FAILED" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ReleaseStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ReleaseStatus> for String {
    fn from(status: ReleaseStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which release statuses the search endpoint should return.
///
/// Serializes to the boolean-per-status fields of the search body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusFilter {
    pub planned: bool,
    pub paused: bool,
    pub in_progress: bool,
    pub completed: bool,
    pub aborted: bool,
    pub failed: bool,
}

impl StatusFilter {
    pub const fn all() -> Self {
        Self {
            planned: true,
            paused: true,
            in_progress: true,
            completed: true,
            aborted: true,
            failed: true,
        }
    }

    pub const fn only_failed() -> Self {
        Self {
            planned: false,
            paused: false,
            in_progress: false,
            completed: false,
            aborted: false,
            failed: true,
        }
    }

    /// Names of the included statuses, in search-body order.
    pub fn included(&self) -> Vec<&'static str> {
        [
            ("planned", self.planned),
            ("paused", self.paused),
            ("inProgress", self.in_progress),
            ("completed", self.completed),
            ("aborted", self.aborted),
            ("failed", self.failed),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self::all()
    }
}
