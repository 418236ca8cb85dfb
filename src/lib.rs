//! Release monitor for XL Release.
//!
//! Polls the orchestration server for failed releases in a handful of tag
//! groups and writes a Markdown status report (plus a Markdeep-rendered HTML
//! twin) to disk on a fixed cadence.

pub mod client;
pub mod config;
pub mod ident;
pub mod models;
pub mod monitor;
pub mod poll;
pub mod report;
pub mod search;
pub mod writer;
