use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ModelError, ReleaseStatus, Task};
use crate::client::XlrClient;
use crate::ident::{parse_id, IdPart};

/// A release as returned by the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub status: ReleaseStatus,
    #[serde(rename = "currentPhase", default)]
    pub current_phase: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A release found by search, with its active tasks.
///
/// `id` is always the last `Release` segment of `id_long`. `url` stays empty
/// until the search that produced the release has assembled its full result.
#[derive(Debug, Clone)]
pub struct Release {
    pub id_long: String,
    pub id: String,
    pub title: String,
    pub status: ReleaseStatus,
    pub current_phase: Option<String>,
    pub url: String,
    pub active_tasks: Vec<Task>,
    pub extra: Map<String, Value>,
}

impl Release {
    /// Build a release from its record, fetching active tasks (and through
    /// them, their phases) one after another.
    pub async fn hydrate(record: ReleaseRecord, client: &XlrClient) -> Result<Self, ModelError> {
        let id = parse_id(&record.id, IdPart::Release, true)?;

        let mut active_tasks = Vec::new();
        for task in client.get_active_tasks(&id).await? {
            let task = Task::hydrate(task, client).await?;
            tracing::debug!("{}", task);
            active_tasks.push(task);
        }

        Ok(Self {
            id_long: record.id,
            id,
            title: record.title,
            status: record.status,
            current_phase: record.current_phase,
            url: String::new(),
            active_tasks,
            extra: record.extra,
        })
    }

    /// Whether the release sits in one of the given phases.
    pub fn in_any_phase(&self, phases: &[String]) -> bool {
        self.current_phase
            .as_ref()
            .is_some_and(|current| phases.iter().any(|p| p == current))
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Release: [{}]", self.title)?;
        writeln!(f, " url: {}", self.url)?;
        writeln!(f, " status: {}", self.status)?;
        writeln!(
            f,
            " Current phase: {}",
            self.current_phase.as_deref().unwrap_or("-")
        )
    }
}
