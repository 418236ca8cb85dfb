//! Paginated release search.

use std::time::Instant;

use serde::Serialize;

use crate::client::XlrClient;
use crate::models::{ModelError, Release, StatusFilter};

/// Results per page requested from the search endpoint.
pub const DEFAULT_PAGE_SIZE: u32 = 15;

/// What to search for.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub title: String,
    pub tags: Vec<String>,
    pub statuses: StatusFilter,
    /// Releases whose current phase is listed here are dropped client-side.
    pub except_phases: Vec<String>,
    pub page_size: u32,
}

impl SearchQuery {
    pub fn new(title: impl Into<String>, tags: &[&str], statuses: StatusFilter) -> Self {
        Self {
            title: title.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            statuses,
            except_phases: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn except_phases(mut self, phases: &[&str]) -> Self {
        self.except_phases = phases.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn body(&self) -> SearchBody<'_> {
        SearchBody {
            title: &self.title,
            tags: &self.tags,
            statuses: self.statuses,
        }
    }
}

/// JSON body of the search endpoint.
#[derive(Debug, Serialize)]
pub struct SearchBody<'a> {
    pub title: &'a str,
    pub tags: &'a [String],
    #[serde(flatten)]
    pub statuses: StatusFilter,
}

/// Drop releases sitting in an excluded phase.
pub fn exclude_phases(releases: Vec<Release>, except_phases: &[String]) -> Vec<Release> {
    if except_phases.is_empty() {
        return releases;
    }
    releases
        .into_iter()
        .filter(|r| !r.in_any_phase(except_phases))
        .collect()
}

/// Run a search to exhaustion.
///
/// Pages are requested from zero until one comes back empty. Every release
/// of a page is hydrated before the phase filter runs, and links are only
/// assigned once the whole result set is known.
pub async fn search_releases(
    client: &XlrClient,
    query: &SearchQuery,
) -> Result<Vec<Release>, ModelError> {
    let started = Instant::now();
    tracing::info!(
        "search_releases(title='{}', tags: {:?}, statuses: [{}])",
        query.title,
        query.tags,
        query.statuses.included().join(", ")
    );

    let body = query.body();
    let mut releases: Vec<Release> = Vec::new();
    let mut page = 0;
    loop {
        let records = client
            .search_releases_page(&body, page, query.page_size)
            .await?;
        if records.is_empty() {
            break;
        }

        let mut hydrated = Vec::with_capacity(records.len());
        for record in records {
            hydrated.push(Release::hydrate(record, client).await?);
        }

        let unfiltered = hydrated.len();
        let kept = exclude_phases(hydrated, &query.except_phases);
        tracing::info!("{} found.", kept.len());
        if kept.len() != unfiltered {
            tracing::info!(
                "{} releases filtered out: their phases are not important for us.",
                unfiltered - kept.len()
            );
        }
        releases.extend(kept);
        page += 1;
    }

    let elapsed_ms = started.elapsed().as_millis();
    match releases.len() {
        0 => tracing::info!("No release found."),
        1 => tracing::info!("One release found. ({}ms/release)", elapsed_ms),
        n => tracing::info!(
            "{} releases found {}ms/release.",
            n,
            elapsed_ms / n as u128
        ),
    }

    for release in &mut releases {
        release.url = client.release_url(&release.id_long);
        tracing::debug!("{}", release);
    }
    Ok(releases)
}
