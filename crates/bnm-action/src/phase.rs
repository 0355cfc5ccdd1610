//! The two phases of a job step: `main` issues a number, `post` commits it.
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use bnm_core::{ContentError, CounterProtocol, CounterStore, MetricsHandle};
use bnm_github::{GitHubConfig, GitHubContents};
use bnm_model::{AccessToken, DeferredState, Reservation, StoreLocation};

use crate::{
    config::MainConfig,
    workflow::{OutputSink, StateStore},
};

pub const OUT_BUILD_NUMBER: &str = "build_number";
pub const OUT_PREVIOUS_NUMBER: &str = "previous_number";
pub const OUT_CREATED: &str = "created";

/// Build the protocol for a counter file in a GitHub repository.
pub fn connect(
    cfg: &GitHubConfig,
    location: &StoreLocation,
    token: AccessToken,
    metrics: MetricsHandle,
) -> Result<CounterProtocol, ContentError> {
    let backend = GitHubContents::new(cfg, location, token)?;
    let store = CounterStore::new(Arc::new(backend), location.path()).with_metrics(metrics);
    Ok(CounterProtocol::new(store))
}

/// Issue a build number and publish it as step outputs.
///
/// In deferred mode nothing is written to the counter file; the reservation is saved
/// to `state` for [`run_post`] once the outputs are set. Otherwise the number is
/// persisted right away.
pub async fn run_main(
    cfg: &MainConfig,
    protocol: &CounterProtocol,
    state: &dyn StateStore,
    outputs: &dyn OutputSink,
) -> anyhow::Result<Reservation> {
    if cfg.defer_commit && !state.available() {
        anyhow::bail!(
            "defer_commit requires a runner state file (GITHUB_STATE); set defer_commit to false to commit immediately"
        );
    }

    info!(
        id = %cfg.id,
        location = %cfg.location,
        initial = cfg.initial_number,
        defer_commit = cfg.defer_commit,
        "managing build number"
    );

    let reservation = if cfg.defer_commit {
        protocol.peek_and_reserve(&cfg.id, cfg.initial_number).await
    } else {
        protocol.atomic_increment(&cfg.id, cfg.initial_number).await
    }
    .with_context(|| format!("failed to issue build number for {}", cfg.id))?;

    for (name, value) in [
        (OUT_BUILD_NUMBER, reservation.new_number.to_string()),
        (OUT_PREVIOUS_NUMBER, reservation.previous_number.to_string()),
        (OUT_CREATED, reservation.created.to_string()),
    ] {
        outputs
            .set_output(name, &value)
            .with_context(|| format!("failed to set output {name}"))?;
    }

    // Saved last: a `main` that failed leaves nothing for `post` to commit.
    if state.available() {
        state
            .save(&DeferredState {
                id: cfg.id.clone(),
                initial_number: cfg.initial_number,
                location: cfg.location.clone(),
                token: cfg.token.clone(),
                new_number: reservation.new_number,
                defer_commit: cfg.defer_commit,
            })
            .context("failed to save state for the post phase")?;
    }

    info!("Build number: {}", reservation.new_number);
    Ok(reservation)
}

/// Result of the `post` phase. The phase itself never fails the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    /// Nothing to commit.
    Skipped,
    Committed { number: i64 },
    /// The commit did not happen; a warning was emitted.
    Failed,
}

/// Commit the number reserved by the `main` phase, if it deferred the commit.
pub async fn run_post<F>(state: &dyn StateStore, connect: F) -> PostOutcome
where
    F: FnOnce(&DeferredState) -> Result<CounterProtocol, ContentError>,
{
    let saved = match state.load() {
        Ok(Some(saved)) => saved,
        Ok(None) => {
            info!("no saved build number state; nothing to commit");
            return PostOutcome::Skipped;
        }
        Err(e) => {
            info!(error = %e, "saved build number state is unusable; nothing to commit");
            return PostOutcome::Skipped;
        }
    };

    if !saved.defer_commit {
        info!(id = %saved.id, "build number was committed by the main phase");
        return PostOutcome::Skipped;
    }

    info!(id = %saved.id, number = saved.new_number, location = %saved.location, "saving build number");

    let protocol = match connect(&saved) {
        Ok(protocol) => protocol,
        Err(e) => {
            warn!(error = %e, "failed to save build number {}", saved.new_number);
            return PostOutcome::Failed;
        }
    };

    match protocol.commit(&saved.id, saved.new_number).await {
        Ok(()) => {
            info!("Build number {} successfully saved", saved.new_number);
            PostOutcome::Committed {
                number: saved.new_number,
            }
        }
        Err(e) => {
            warn!(error = %e, "failed to save build number {}", saved.new_number);
            PostOutcome::Failed
        }
    }
}
