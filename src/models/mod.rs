//! Domain models for XL Release entities.
//!
//! # Hierarchy
//!
//! - [`Release`]: a running release found by search. Owns its active tasks.
//! - [`Task`]: an active task inside a release. Owns the [`Phase`] it sits in.
//! - [`Phase`]: a stage of a release, fetched by id.
//!
//! Each entity is deserialized from the API into a `*Record` first and then
//! hydrated into the full model, which performs the nested fetches. Nothing
//! is cached: two tasks in the same phase fetch that phase twice.

mod phase;
mod release;
mod status;
mod task;

pub use phase::*;
pub use release::*;
pub use status::*;
pub use task::*;

use thiserror::Error;

use crate::client::ClientError;
use crate::ident::IdError;

/// Errors raised while turning API records into models.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("malformed id: {0}")]
    Id(#[from] IdError),
}
