// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vidcast - publish videos to social platforms.
//!
//! This is the binary entry point: one-off publishing, job management and
//! the background worker.

mod jobs;
mod publish;
mod shutdown;
mod worker;

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::error;

use vidcast_config::VidcastConfig;
use vidcast_core::{JobStatus, Platform, VidcastError};
use vidcast_platforms::ClientRegistry;
use vidcast_publish::{JobService, PublicationService};
use vidcast_storage::SqliteStore;

/// Vidcast - publish videos to social platforms.
#[derive(Parser, Debug)]
#[command(name = "vidcast", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or upgrade the database schema.
    Migrate,
    /// Run the background job worker.
    Worker {
        /// Run a single sweep and exit.
        #[arg(long)]
        once: bool,
    },
    /// Inspect and manage publication jobs.
    #[command(subcommand)]
    Jobs(JobsCommand),
    /// Publish a video to one platform now.
    Publish(TargetArgs),
    /// Refresh stats for an already published video.
    SyncStats(TargetArgs),
    /// List the platforms this build can publish to.
    Platforms,
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Subcommand, Debug)]
enum JobsCommand {
    /// List jobs for a tenant, newest first.
    List {
        #[arg(long)]
        tenant: String,
        #[arg(long, value_parser = parse_status)]
        status: Option<JobStatus>,
        #[arg(long, value_parser = parse_platform)]
        platform: Option<Platform>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show one job.
    Show {
        #[arg(long)]
        tenant: String,
        id: String,
    },
    /// Cancel a job that has not finished.
    Cancel {
        #[arg(long)]
        tenant: String,
        id: String,
    },
    /// Queue a publication job.
    Create {
        #[arg(long)]
        tenant: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        video: String,
        #[arg(long, value_parser = parse_platform)]
        platform: Platform,
        /// Workspace whose credentials to use.
        #[arg(long)]
        workspace: Option<String>,
        /// RFC 3339 start time; omit to run as soon as possible.
        #[arg(long, value_parser = parse_time)]
        scheduled_at: Option<DateTime<Utc>>,
        #[arg(long)]
        max_retries: Option<u32>,
    },
}

/// Selects one video, one workspace and one platform.
#[derive(Args, Debug)]
struct TargetArgs {
    #[arg(long)]
    tenant: String,
    #[arg(long)]
    workspace: String,
    #[arg(long)]
    video: String,
    #[arg(long)]
    platform: String,
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    Platform::from_str(s).map_err(|_| {
        let known: Vec<&str> = Platform::ALL.iter().map(Platform::as_str).collect();
        format!("unknown platform `{s}` (expected one of: {})", known.join(", "))
    })
}

fn parse_status(s: &str) -> Result<JobStatus, String> {
    JobStatus::from_str(s).map_err(|_| format!("unknown job status `{s}`"))
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 time `{s}`: {e}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => vidcast_config::load_and_validate_path(path),
        None => vidcast_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            vidcast_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.log.level);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: VidcastConfig) -> Result<(), VidcastError> {
    match command {
        Commands::Migrate => {
            let store = SqliteStore::open(&config.storage).await?;
            store.close().await?;
            println!("database ready: {}", config.storage.database_path);
            Ok(())
        }
        Commands::Worker { once } => worker::run_worker(config, once).await,
        Commands::Jobs(cmd) => {
            let store = Arc::new(SqliteStore::open(&config.storage).await?);
            let service = JobService::new(store).with_default_max_retries(config.worker.default_max_retries);
            jobs::run_jobs(&service, cmd).await
        }
        Commands::Publish(target) => {
            let (store, publisher) = open_pipeline(&config).await?;
            publish::run_publish(&store, &publisher, &target).await
        }
        Commands::SyncStats(target) => {
            let (store, publisher) = open_pipeline(&config).await?;
            publish::run_sync_stats(&store, &publisher, &target).await
        }
        Commands::Platforms => {
            let registry = ClientRegistry::builtin(&config)?;
            for platform in registry.platforms() {
                println!("{platform}");
            }
            Ok(())
        }
        Commands::Config => {
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| VidcastError::Internal(format!("failed to render config: {e}")))?;
            print!("{rendered}");
            Ok(())
        }
    }
}

/// Storage plus a publication service backed by the built-in clients.
async fn open_pipeline(config: &VidcastConfig) -> Result<(SqliteStore, PublicationService), VidcastError> {
    let registry = ClientRegistry::builtin(config)?;
    let store = SqliteStore::open(&config.storage).await?;
    Ok((store, PublicationService::new(Arc::new(registry))))
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), VidcastError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vidcast={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_job_create() {
        let cli = Cli::try_parse_from([
            "vidcast",
            "jobs",
            "create",
            "--tenant",
            "t1",
            "--user",
            "u1",
            "--video",
            "v1",
            "--platform",
            "tiktok",
            "--scheduled-at",
            "2030-01-01T12:00:00Z",
        ])
        .unwrap();
        match cli.command {
            Commands::Jobs(JobsCommand::Create {
                platform,
                scheduled_at,
                ..
            }) => {
                assert_eq!(platform, Platform::Tiktok);
                assert!(scheduled_at.is_some());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_platform() {
        let err = Cli::try_parse_from([
            "vidcast",
            "jobs",
            "list",
            "--tenant",
            "t1",
            "--platform",
            "linkedin",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("unknown platform"));
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["vidcast", "worker", "--once", "--config", "/tmp/v.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/v.toml")));
        assert!(matches!(cli.command, Commands::Worker { once: true }));
    }

    #[test]
    fn default_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&VidcastConfig::default()).unwrap();
        assert!(rendered.contains("[worker]"));
        assert!(rendered.contains("database_path"));
    }
}
