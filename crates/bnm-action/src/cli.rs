use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Issue monotonically increasing build numbers stored in a repository file.
#[derive(Debug, Parser)]
#[command(name = "bnm-action", version)]
pub struct Cli {
    #[command(subcommand)]
    pub phase: Phase,

    /// Write Prometheus text metrics to this file before exiting.
    #[arg(long, global = true, env = "BNM_METRICS_FILE")]
    pub metrics_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Phase {
    /// Reserve (deferred mode) or increment the build number and publish outputs.
    Main(MainArgs),
    /// Commit the number reserved by `main` once the job has finished.
    Post,
}

/// Step inputs. Each one falls back to the runner's `INPUT_*` variable.
#[derive(Debug, Clone, Default, Args)]
pub struct MainArgs {
    /// Counter id.
    #[arg(long, env = "INPUT_ID")]
    pub id: Option<String>,

    /// First number issued for an id that has none yet.
    #[arg(long, env = "INPUT_INITIAL_NUMBER", allow_hyphen_values = true)]
    pub initial_number: Option<String>,

    /// Repository holding the counter file, as owner/name.
    #[arg(long, env = "INPUT_GH_REPO")]
    pub gh_repo: Option<String>,

    /// Token with contents write access. Defaults to GITHUB_TOKEN.
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Counter file path inside the repository.
    #[arg(long, env = "INPUT_PATH")]
    pub path: Option<String>,

    /// Branch to read and commit to. Defaults to the repository's default branch.
    #[arg(long, env = "INPUT_BRANCH")]
    pub branch: Option<String>,

    /// Save the number only after the job succeeds (true) or right away (false).
    #[arg(long, env = "INPUT_DEFER_COMMIT")]
    pub defer_commit: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_main_flags() {
        let cli = Cli::try_parse_from([
            "bnm-action",
            "main",
            "--id",
            "app",
            "--initial-number",
            "-5",
            "--gh-repo",
            "acme/builds",
            "--defer-commit",
            "false",
        ])
        .unwrap();

        let Phase::Main(args) = cli.phase else {
            panic!("expected main phase");
        };
        assert_eq!(args.id.as_deref(), Some("app"));
        assert_eq!(args.initial_number.as_deref(), Some("-5"));
        assert_eq!(args.gh_repo.as_deref(), Some("acme/builds"));
        assert_eq!(args.defer_commit.as_deref(), Some("false"));
    }

    #[test]
    fn parses_post_with_global_metrics_file() {
        let cli = Cli::try_parse_from(["bnm-action", "post", "--metrics-file", "/tmp/m.prom"])
            .unwrap();
        assert!(matches!(cli.phase, Phase::Post));
        assert_eq!(cli.metrics_file, Some(PathBuf::from("/tmp/m.prom")));
    }
}
