mod cli;
mod config;
mod phase;
mod workflow;

use std::{fs, path::Path, process::ExitCode, sync::Arc};

use clap::Parser;
use tracing::{debug, error, warn};

use bnm_core::{MetricsHandle, noop_metrics};
use bnm_github::GitHubConfig;
use bnm_observe::{LoggerConfig, init_logger};
use bnm_prometheus::PrometheusMetrics;

use crate::{
    cli::{Cli, MainArgs, Phase},
    config::MainConfig,
    phase::{connect, run_main, run_post},
    workflow::{Environment, RunnerOutputs, RunnerState},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let env = Environment::capture();
    run(&cli, &env).await
}

/// Run one phase. Only the `main` phase can produce a failing exit code.
async fn run(cli: &Cli, env: &Environment) -> ExitCode {
    let post = matches!(cli.phase, Phase::Post);

    // 1) logger
    let (log_cfg, rejected) = match LoggerConfig::for_runner(|key| env.get(key)) {
        Ok(cfg) => (cfg, None),
        Err(e) => (LoggerConfig::default(), Some(e)),
    };
    if let Err(e) = init_logger(&log_cfg) {
        warn!(error = %e, "logger not installed, keeping the current subscriber");
    }
    match rejected {
        Some(e) if post => warn!(error = %e, "invalid logger configuration, using defaults"),
        Some(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
        None => debug!(format = ?log_cfg.format, "logger initialized"),
    }

    // 2) metrics + backend config
    let metrics = match PrometheusMetrics::new() {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            warn!(error = %e, "metrics disabled");
            None
        }
    };
    let handle: MetricsHandle = match &metrics {
        Some(metrics) => Arc::new(metrics.clone()),
        None => noop_metrics(),
    };
    let github = GitHubConfig::from_env(|key| env.get(key));
    let state = RunnerState::from_env(env);

    // 3) phase
    let code = match &cli.phase {
        Phase::Main(args) => match main_phase(args, env, &github, handle, &state).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e:#}");
                ExitCode::FAILURE
            }
        },
        Phase::Post => {
            let outcome = run_post(&state, |saved| {
                connect(&github, &saved.location, saved.token.clone(), handle)
            })
            .await;
            debug!(?outcome, "post phase finished");
            ExitCode::SUCCESS
        }
    };

    // 4) metrics export
    if let (Some(path), Some(metrics)) = (&cli.metrics_file, &metrics) {
        if let Err(e) = write_metrics(metrics, path) {
            warn!(error = %e, path = %path.display(), "failed to write metrics file");
        }
    }
    code
}

async fn main_phase(
    args: &MainArgs,
    env: &Environment,
    github: &GitHubConfig,
    metrics: MetricsHandle,
    state: &RunnerState,
) -> anyhow::Result<()> {
    let cfg = MainConfig::from_args(args, env.get("GITHUB_TOKEN"))?;
    let protocol = connect(github, &cfg.location, cfg.token.clone(), metrics)?;
    let outputs = RunnerOutputs::from_env(env);

    run_main(&cfg, &protocol, state, &outputs).await?;
    Ok(())
}

fn write_metrics(metrics: &PrometheusMetrics, path: &Path) -> anyhow::Result<()> {
    fs::write(path, metrics.encode_text()?)?;
    Ok(())
}
