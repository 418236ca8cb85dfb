use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ModelError, Phase};
use crate::client::XlrClient;
use crate::ident::{CompositeId, IdPart};

/// A task as returned by the active-tasks endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub task_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An active task of a release, together with the phase it belongs to.
///
/// `phase_id` and `release_id` are always derived from `id_long`.
#[derive(Debug, Clone)]
pub struct Task {
    pub id_long: String,
    /// `id_long` up to and including the last `Task` segment.
    pub id: String,
    /// `id_long` up to and including the last `Phase` segment.
    pub phase_id: String,
    /// The bare `Release...` segment.
    pub release_id: String,
    pub title: String,
    pub status: String,
    pub task_type: String,
    pub phase: Phase,
    pub extra: Map<String, Value>,
}

impl Task {
    /// Build a task from its record, fetching the owning phase.
    pub async fn hydrate(record: TaskRecord, client: &XlrClient) -> Result<Self, ModelError> {
        let (id, phase_id, release_id) = {
            let composite = CompositeId::parse(&record.id);
            (
                composite.extract(IdPart::Task, false)?.to_string(),
                composite.extract(IdPart::Phase, false)?.to_string(),
                composite.extract(IdPart::Release, true)?.to_string(),
            )
        };
        let phase = client.get_phase(&phase_id).await?;

        Ok(Self {
            id_long: record.id,
            id,
            phase_id,
            release_id,
            title: record.title,
            status: record.status,
            task_type: record.task_type,
            phase,
            extra: record.extra,
        })
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Task: {} / {}", self.phase.title, self.title)?;
        writeln!(f, " Status: {}", self.status)
    }
}
