//! Pipeline orchestrator.
//!
//! Runs the full enrichment sequence: fetch the ranked trend list, then for
//! each retained topic fetch search context and synthesize an analysis,
//! pacing between topics, and finally persist the snapshot. Topics are
//! processed strictly sequentially in rank order; a provider failure on one
//! topic degrades that record, never the run.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use trendlens_providers::{SearchClient, SynthesisClient, TrendClient};
use trendlens_shared::{EnrichedRecord, Result, Snapshot};

use crate::snapshot::write_snapshot;

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Runtime parameters for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Cap on the number of topics enriched, applied to the head of the
    /// ranked list.
    pub max_topics: usize,
    /// Delay inserted after each processed topic.
    pub pacing: Duration,
    /// Where the snapshot is written.
    pub snapshot_path: PathBuf,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Observer hooks for pipeline progress, implemented by the CLI spinner.
pub trait ProgressReporter: Send + Sync {
    /// A new phase of the run started.
    fn phase(&self, message: &str);
    /// One topic finished (enriched or degraded), `current` of `total`.
    fn topic_processed(&self, topic: &str, current: usize, total: usize);
    /// The run completed.
    fn done(&self, summary: &RunSummary);
}

/// No-op reporter for tests and library callers.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _message: &str) {}
    fn topic_processed(&self, _topic: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &RunSummary) {}
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Counters for one completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Records written to the snapshot.
    pub records: usize,
    /// Records that got a usable search result.
    pub search_hits: usize,
    /// Records that got a synthesized analysis.
    pub analyses: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Run the enrichment pipeline end to end, persist the snapshot, and
/// return it for rendering.
///
/// An empty trend list is a terminal state, not an error: the run persists
/// and returns an empty snapshot. Only snapshot persistence can fail the
/// run.
#[instrument(skip_all, fields(max_topics = config.max_topics))]
pub async fn run(
    trends: &TrendClient,
    search: &SearchClient,
    synthesis: &SynthesisClient,
    config: &RunConfig,
    progress: &dyn ProgressReporter,
) -> Result<Snapshot> {
    let started = Instant::now();

    progress.phase("Fetching trend list");
    let mut items = trends.fetch_trends().await;

    if items.is_empty() {
        warn!("no trends fetched, persisting empty snapshot");
        write_snapshot(&config.snapshot_path, &Vec::new())?;
        progress.done(&RunSummary {
            records: 0,
            search_hits: 0,
            analyses: 0,
            elapsed: started.elapsed(),
        });
        return Ok(Vec::new());
    }

    items.truncate(config.max_topics);
    let total = items.len();
    info!(total, "enriching topics");

    let mut snapshot: Snapshot = Vec::with_capacity(total);
    let mut search_hits = 0;
    let mut analyses = 0;

    for (index, item) in items.into_iter().enumerate() {
        if item.topic.trim().is_empty() {
            warn!(rank = index + 1, "skipping blank topic");
            continue;
        }

        progress.phase(&format!("Enriching {}", item.topic));

        let search_result = search.search(&item.topic).await;
        if search_result.is_some() {
            search_hits += 1;
        }

        let analysis = synthesis
            .synthesize(&item.topic, search_result.as_ref())
            .await
            .into_text();
        if analysis.is_some() {
            analyses += 1;
        }

        snapshot.push(EnrichedRecord {
            topic: item.topic.clone(),
            popularity: item.popularity,
            search_result,
            analysis,
        });

        progress.topic_processed(&item.topic, index + 1, total);

        // Pace after every topic, the last included, to leave headroom for
        // whatever provider call comes next.
        tokio::time::sleep(config.pacing).await;
    }

    write_snapshot(&config.snapshot_path, &snapshot)?;

    let summary = RunSummary {
        records: snapshot.len(),
        search_hits,
        analyses,
        elapsed: started.elapsed(),
    };
    info!(
        records = summary.records,
        search_hits = summary.search_hits,
        analyses = summary.analyses,
        "run complete"
    );
    progress.done(&summary);

    Ok(snapshot)
}
