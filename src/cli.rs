use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{self, ConfigError, ConfigStore};
use crate::mapping::MappingStore;
use crate::providers::github::GitHubApi;
use crate::providers::todoist::TodoistApi;
use crate::sync::{self, SyncReport};

pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init,
    Sync { user: Option<String> },
    Watch { user: Option<String>, interval: Duration },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config_dir: Option<PathBuf>,
    pub command: Command,
}

impl Invocation {
    pub fn config_store(&self) -> ConfigStore {
        ConfigStore::new(
            self.config_dir
                .clone()
                .unwrap_or_else(config::default_config_dir),
        )
    }
}

/// Parse arguments (without the program name).
///
/// Supported forms:
///   github-todoist-sync init
///   github-todoist-sync sync [--user NAME]
///   github-todoist-sync watch [--interval SECS] [--user NAME]
///   github-todoist-sync --config-dir PATH sync
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut config_dir: Option<PathBuf> = None;
    let mut user: Option<String> = None;
    let mut interval: Option<Duration> = None;
    let mut command: Option<&str> = None;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" | "help" => {
                return Ok(Invocation {
                    config_dir,
                    command: Command::Help,
                })
            }
            "--config-dir" => {
                config_dir = Some(PathBuf::from(flag_value(args, &mut i, "--config-dir")?));
            }
            "-u" | "--user" => {
                user = Some(flag_value(args, &mut i, "--user")?.to_string());
            }
            "-i" | "--interval" => {
                let raw = flag_value(args, &mut i, "--interval")?;
                let secs: u64 = raw
                    .parse()
                    .with_context(|| format!("Invalid interval: {raw}"))?;
                if secs == 0 {
                    bail!("Interval must be at least one second");
                }
                interval = Some(Duration::from_secs(secs));
            }
            other if other.starts_with('-') => bail!("Unknown option: {other}"),
            other => {
                if let Some(existing) = command {
                    bail!("Unexpected argument '{other}' after command '{existing}'");
                }
                command = Some(other);
            }
        }
        i += 1;
    }

    let command = match command {
        None => Command::Help,
        Some("init") => Command::Init,
        Some("sync") => Command::Sync { user },
        Some("watch") => Command::Watch {
            user,
            interval: interval.unwrap_or(DEFAULT_WATCH_INTERVAL),
        },
        Some(other) => bail!("Unknown command: {other}"),
    };

    if interval.is_some() && !matches!(command, Command::Watch { .. }) {
        bail!("--interval only applies to the watch command");
    }

    Ok(Invocation {
        config_dir,
        command,
    })
}

fn flag_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    match args.get(*i) {
        Some(v) if !v.starts_with('-') => Ok(v.as_str()),
        _ => bail!("Missing value for {flag}"),
    }
}

pub fn handle_init(store: &ConfigStore) -> Result<()> {
    let dir = store.get_config_dir()?;
    let report = store.init_config()?;

    println!("Config directory: {}", dir.display());
    for path in [store.config_path(), store.mapping_path()] {
        let state = if report.created.contains(&path) {
            "created"
        } else {
            "exists"
        };
        println!("  {state:<8} {}", path.display());
    }
    println!();
    println!("Map repositories to Todoist projects in config.json, e.g.");
    println!("  {{\"owner/repo\": 2203306141}}");
    println!(
        "Credentials come from {} or GITHUB_TOKEN / GITHUB_USERNAME / TODOIST_API_TOKEN.",
        store.credentials_path().display()
    );
    Ok(())
}

/// One full cycle with freshly loaded config and credentials.
pub async fn handle_sync(store: &ConfigStore, user: Option<&str>) -> Result<SyncReport> {
    store.init_config()?;
    let repo_project_map = store.load_repo_project_map()?;
    let credentials = store.load_credentials()?;
    let username = user
        .map(str::to_string)
        .or(credentials.github_username)
        .ok_or(ConfigError::MissingCredential("GITHUB_USERNAME"))?;

    if repo_project_map.is_empty() {
        tracing::warn!(
            path = %store.config_path().display(),
            "no repositories mapped to Todoist projects; every item will be skipped"
        );
    }

    let github = GitHubApi::new(credentials.github_token);
    let todoist = TodoistApi::new(credentials.todoist_token);
    let mapping_store = MappingStore::new(store.mapping_path());

    let report = sync::run_cycle(
        &github,
        &todoist,
        &username,
        &repo_project_map,
        &mapping_store,
    )
    .await?;
    Ok(report)
}

pub fn print_report(report: &SyncReport) {
    println!(
        "Created {} task(s), {} already synced, {} skipped (unconfigured repository)",
        report.created, report.already_synced, report.skipped_unconfigured
    );
}

/// Runs a cycle every `interval` until interrupted. A failed cycle is logged and
/// the next one starts from whatever was persisted.
pub async fn handle_watch(
    store: &ConfigStore,
    user: Option<&str>,
    interval: Duration,
) -> Result<()> {
    tracing::info!(interval_secs = interval.as_secs(), "watching for new GitHub activity");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match handle_sync(store, user).await {
                    Ok(report) => print_report(&report),
                    Err(e) => tracing::error!("sync cycle failed: {e:#}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping");
                return Ok(());
            }
        }
    }
}

pub fn print_help() {
    println!("github-todoist-sync: turn your GitHub issues and pull requests into Todoist tasks\n");
    println!("USAGE:");
    println!("  github-todoist-sync [--config-dir PATH] <command>");
    println!();
    println!("COMMANDS:");
    println!("  init                  Create the config directory and default files");
    println!("  sync                  Run one sync cycle");
    println!("  watch                 Run a sync cycle repeatedly");
    println!();
    println!("OPTIONS:");
    println!("  -u, --user <name>     GitHub user to sync (defaults to GITHUB_USERNAME)");
    println!("  -i, --interval <secs> Seconds between cycles for watch (default 300)");
    println!("  --config-dir <path>   Use a different config directory");
    println!();
    println!("Set RUST_LOG=debug for detailed logging.");
}
