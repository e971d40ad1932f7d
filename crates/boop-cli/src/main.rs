//! `boop` — track application events from the command line.

mod script;

use anyhow::{bail, Context};
use boop_core::BoopConfig;
use boop_sink::{build_sink, EventHandle};
use boop_tracker::SessionTracker;
use clap::{Parser, Subcommand};
use script::{parse_payload, parse_script, Step};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "boop", about = "Boop — lightweight event and session tracking")]
struct Cli {
    /// Path to config file (defaults to $BOOP_CONFIG, ./boop.toml, ~/.config/boop/boop.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track one user-initiated event
    Track {
        /// Event name
        event: String,
        /// Optional label (JSON or plain text)
        #[arg(short, long)]
        label: Option<String>,
        /// Optional value (JSON or plain text)
        #[arg(short, long)]
        value: Option<String>,
    },
    /// Track an application launch
    Launch {
        /// Optional label (JSON or plain text)
        #[arg(short, long)]
        label: Option<String>,
        /// Optional value (JSON or plain text)
        #[arg(short, long)]
        value: Option<String>,
    },
    /// Run a script of tracker calls, one per line ("-" reads stdin)
    Replay {
        /// Script file
        script: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = BoopConfig::discover(cli.config.as_deref())?;
    let sink = build_sink(&config.sink)?;
    if sink.name() == "memory" {
        warn!("Using the memory sink; events are discarded when boop exits");
    }
    if config.tracker.disabled {
        warn!("Tracking is disabled; set tracker.disabled = false or BOOP_DISABLED=0");
    }
    let mut tracker = SessionTracker::new(config.tracker, sink)?;
    info!(namespace = %tracker.namespace(), "Tracker ready");

    let steps = match cli.command {
        Commands::Track {
            event,
            label,
            value,
        } => vec![Step::Event {
            name: event,
            label: label.as_deref().map(parse_payload),
            value: value.as_deref().map(parse_payload),
        }],
        Commands::Launch { label, value } => vec![Step::Launch {
            label: label.as_deref().map(parse_payload),
            value: value.as_deref().map(parse_payload),
        }],
        Commands::Replay { script } => {
            let source = read_script(&script).await?;
            parse_script(&source).with_context(|| format!("Invalid script '{}'", script.display()))?
        }
    };

    let handles = run_steps(&mut tracker, steps).await;
    let total = handles.len();
    let mut failed = 0;
    for handle in handles {
        let path = handle.path();
        match handle.wait().await {
            Ok(()) => println!("{path}"),
            Err(e) => {
                failed += 1;
                eprintln!("{path}: {e}");
            }
        }
    }
    info!(written = total - failed, failed, "Done");
    if failed > 0 {
        bail!("{failed} of {total} event(s) could not be written");
    }
    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn read_script(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        tokio::io::stdin().read_to_string(&mut source).await?;
        return Ok(source);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read script '{}'", path.display()))
}

async fn run_steps(tracker: &mut SessionTracker, steps: Vec<Step>) -> Vec<EventHandle> {
    let mut handles = Vec::new();
    for step in steps {
        let handle = match step {
            Step::Launch { label, value } => tracker.track_app_launch(label, value),
            Step::Start => tracker.track_session_start(),
            Step::Stop => tracker.track_session_stop(),
            Step::Event { name, label, value } => tracker.track_event(&name, label, value),
            Step::Sleep(duration) => {
                tokio::time::sleep(duration).await;
                None
            }
        };
        handles.extend(handle);
    }
    handles
}

#[cfg(test)]
mod tests {
    use super::*;
    use boop_core::{ManualClock, TrackerConfig};
    use boop_sink::MemorySink;
    use std::sync::Arc;

    #[test]
    fn cli_parses_track() {
        let args = ["boop", "-c", "x.toml", "track", "Tap", "--value", "3"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Commands::Track { event, label, value } => {
                assert_eq!(event, "Tap");
                assert_eq!(label, None);
                assert_eq!(value.as_deref(), Some("3"));
            }
            _ => panic!("expected track"),
        }
    }

    #[tokio::test]
    async fn replayed_steps_return_one_handle_per_write() {
        let sink = MemorySink::new();
        let clock = ManualClock::default();
        let config = TrackerConfig::new("cli").enabled();
        let mut tracker =
            SessionTracker::with_clock(config, Arc::new(sink.clone()), Arc::new(clock)).unwrap();

        let steps = parse_script("launch\nevent Tap\nsleep 0\nstop\n").unwrap();
        let handles = run_steps(&mut tracker, steps).await;

        // The implicit session start is written but not handed back.
        assert_eq!(handles.len(), 3);
        assert_eq!(sink.event_names(), vec!["App Launch", "Session Start", "Tap", "Session Stop"]);
        for handle in handles {
            handle.wait().await.unwrap();
        }
    }

    #[tokio::test]
    async fn reads_script_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("script.boop");
        std::fs::write(&path, "start\n").unwrap();
        assert_eq!(read_script(&path).await.unwrap(), "start\n");
    }
}
