//! One report cycle: search every tag group, render, write.

use std::io;
use std::time::Instant;

use chrono::Local;
use thiserror::Error;

use crate::client::XlrClient;
use crate::config::{MonitorConfig, TagGroup};
use crate::models::ModelError;
use crate::report::{build_report, Report, Section};
use crate::search::search_releases;
use crate::writer::{ReportWriter, WrittenFiles};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Failed to write report: {0}")]
    Io(#[from] io::Error),
}

pub struct Monitor {
    client: XlrClient,
    release_title: String,
    groups: Vec<TagGroup>,
    writer: ReportWriter,
}

impl Monitor {
    pub fn new(client: XlrClient, config: &MonitorConfig) -> Self {
        Self {
            client,
            release_title: config.release_title.clone(),
            groups: config.groups.clone(),
            writer: ReportWriter::new(
                config.output_dir.clone(),
                config.release_title.clone(),
                config.keep_files,
            ),
        }
    }

    /// Search every tag group in order.
    pub async fn collect(&self) -> Result<Vec<Section>, ModelError> {
        let mut sections = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let releases = search_releases(&self.client, &group.query(&self.release_title)).await?;
            sections.push(Section {
                heading: group.heading.clone(),
                releases,
            });
        }
        Ok(sections)
    }

    /// Collect and render without touching the disk.
    pub async fn build(&self) -> Result<Report, ModelError> {
        let sections = self.collect().await?;
        Ok(build_report(
            &self.release_title,
            &sections,
            Local::now().naive_local(),
        ))
    }

    /// Run one full cycle.
    pub async fn generate_report(&self) -> Result<WrittenFiles, MonitorError> {
        let started = Instant::now();
        let report = self.build().await?;
        let written = self.writer.write(&report)?;
        tracing::info!(
            "generate_report(): returning after {}seconds.",
            started.elapsed().as_secs()
        );
        Ok(written)
    }
}
