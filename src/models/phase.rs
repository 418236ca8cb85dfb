use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stage of a release. Fields beyond id and title are passed through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
