//! Run configuration: command-line arguments, credentials from the
//! environment, server presets and the tag groups to report on.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::client::Credentials;
use crate::models::StatusFilter;
use crate::search::SearchQuery;

pub const USER_ENV: &str = "XLR_USER";
pub const PASSWORD_ENV: &str = "XLR_PASSWORD";
/// Overrides the URL of the selected [`ServerPreset`].
pub const URL_ENV: &str = "XLR_URL";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Please set {0} as environment variable. Aborting.")]
    MissingEnv(&'static str),

    #[error("Release title not given.")]
    MissingTitle,

    #[error("Directory '{0}' does not exist, aborting.")]
    OutputDirMissing(PathBuf),

    #[error("Run time must be a non-negative, representable number of hours, got {0}")]
    InvalidHours(f64),

    #[error("Poll interval must be a positive number of minutes that fits in a duration")]
    InvalidInterval,
}

/// Known XL Release installations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServerPreset {
    Prod,
    Atz,
}

impl ServerPreset {
    pub fn url(&self) -> &'static str {
        match self {
            Self::Prod => "https://xlrelease.rbgooe.at",
            Self::Atz => "https://xlrelease-atz.rbgooe.at",
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "release-monitor")]
#[command(about = "Writes a Markdown report of failed XL Release releases on a fixed cadence")]
pub struct Args {
    /// Output dir for the report files
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// Keep old files
    #[arg(short = 'k', long = "keep-files")]
    pub keep_files: bool,

    /// The title of the release you want to report
    #[arg(short = 'r', long = "release-title")]
    pub release_title: String,

    /// Run for x hours
    #[arg(long = "hours", default_value_t = 1.0)]
    pub run_hours: f64,

    /// Collect data every x minutes
    #[arg(short = 'w', long = "wait", default_value_t = 3)]
    pub wait_minutes: u64,

    /// Which XL Release server to talk to
    #[arg(long, value_enum, default_value_t = ServerPreset::Prod)]
    pub server: ServerPreset,
}

/// A tag combination searched for and reported as one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroup {
    pub heading: String,
    pub tags: Vec<String>,
    pub statuses: StatusFilter,
    pub except_phases: Vec<String>,
}

impl TagGroup {
    fn failed(tag: &str, except_phases: &[&str]) -> Self {
        Self {
            heading: format!("Failed items with tag: [{}]", tag),
            tags: vec!["drb".to_string(), tag.to_string()],
            statuses: StatusFilter::only_failed(),
            except_phases: except_phases.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The search for this group, restricted to releases titled `title`.
    pub fn query(&self, title: &str) -> SearchQuery {
        SearchQuery {
            title: title.to_string(),
            tags: self.tags.clone(),
            statuses: self.statuses,
            except_phases: self.except_phases.clone(),
            page_size: crate::search::DEFAULT_PAGE_SIZE,
        }
    }
}

/// The groups in report order.
pub fn default_tag_groups() -> Vec<TagGroup> {
    vec![
        TagGroup::failed("release", &[]),
        TagGroup::failed("applikationstests", &["TSTUX"]),
        TagGroup::failed("rollout", &["tstux - Qualitycheck"]),
    ]
}

/// Everything a run needs, validated.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub server_url: String,
    pub credentials: Credentials,
    pub release_title: String,
    pub output_dir: PathBuf,
    pub keep_files: bool,
    pub run_for: Duration,
    pub interval: Duration,
    pub groups: Vec<TagGroup>,
}

impl MonitorConfig {
    /// Validate arguments against the process environment.
    pub fn from_env(args: Args) -> Result<Self, ConfigError> {
        Self::from_args(args, |key| std::env::var(key).ok())
    }

    /// Validate arguments, reading variables through `env`.
    pub fn from_args(
        args: Args,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if args.release_title.trim().is_empty() {
            return Err(ConfigError::MissingTitle);
        }
        if !args.output_dir.is_dir() {
            return Err(ConfigError::OutputDirMissing(args.output_dir));
        }
        let run_for = Duration::try_from_secs_f64(args.run_hours * 3600.0)
            .map_err(|_| ConfigError::InvalidHours(args.run_hours))?;
        let interval = args
            .wait_minutes
            .checked_mul(60)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or(ConfigError::InvalidInterval)?;

        let username = env(USER_ENV).ok_or(ConfigError::MissingEnv(USER_ENV))?;
        let password = env(PASSWORD_ENV).ok_or(ConfigError::MissingEnv(PASSWORD_ENV))?;
        let server_url = env(URL_ENV).unwrap_or_else(|| args.server.url().to_string());

        Ok(Self {
            server_url,
            credentials: Credentials { username, password },
            release_title: args.release_title,
            output_dir: args.output_dir,
            keep_files: args.keep_files,
            run_for,
            interval,
            groups: default_tag_groups(),
        })
    }

    /// Log the run parameters at startup.
    pub fn log_summary(&self) {
        tracing::info!("Run parameters:");
        tracing::info!(" - Server: {}", self.server_url);
        tracing::info!(" - Collecting info every {} minutes.", self.interval.as_secs() / 60);
        tracing::info!(" - Keep files historical: {}", self.keep_files);
        tracing::info!(" - Output directory: {}", self.output_dir.display());
        tracing::info!(" - Release to be monitored: {}", self.release_title);
        tracing::info!(" - Run time: {:.2} hours", self.run_for.as_secs_f64() / 3600.0);
    }
}
