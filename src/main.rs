use std::path::PathBuf;

use clap::Parser;
use tokio::io::AsyncReadExt;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use project_json_sync::project_file::JsonProjection;
use project_json_sync::sync::SyncDaemon;

#[derive(Parser)]
#[command(name = "pjsync")]
#[command(about = "Keeps a structured project file and its project.json sidecar in sync")]
struct Cli {
    /// Directory containing the project files (defaults to the current directory)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Pretty-print the generated project.json
    #[arg(long)]
    pretty: bool,

    /// Write the merged record back to the structured file when the sidecar
    /// changes (deviation from the legacy read-merge-discard behavior)
    #[arg(long)]
    persist_merge: bool,

    /// Verbose logging
    #[arg(long)]
    debug: bool,
}

/// Initialize tracing from RUST_LOG, with a crate-scoped default.
fn init_tracing(debug: bool) {
    let default = if debug {
        "project_json_sync=debug"
    } else {
        "project_json_sync=info"
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    // Explicit shutdown flag handed to the run loop. The lifecycle task owns
    // a two-state interrupt counter: the first CTRL+C requests an orderly
    // shutdown, the second forces exit. It also watches stdin, replacing the
    // blocking console read of the legacy tool: a keypress or EOF ends the
    // run the same way. Every path reports exit code 0.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let mut interrupted = false;
        let mut stdin_open = true;
        let mut stdin = tokio::io::stdin();
        let mut buf = [0u8; 1];
        loop {
            tokio::select! {
                res = signal::ctrl_c() => {
                    if res.is_err() {
                        return;
                    }
                    if !interrupted {
                        interrupted = true;
                        println!("pjsync: shutdown requested. Press CTRL+C again to force exit.");
                        let _ = shutdown_tx.send(true);
                    } else {
                        std::process::exit(0);
                    }
                }
                res = stdin.read(&mut buf), if stdin_open => {
                    // Input or EOF either way: stop reading and shut down.
                    let _ = res;
                    stdin_open = false;
                    let _ = shutdown_tx.send(true);
                }
            }
        }
    });

    let projection = JsonProjection { pretty: cli.pretty };
    let mut daemon = SyncDaemon::new(dir, projection, cli.persist_merge);
    daemon.run(shutdown_rx).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli).await {
        eprintln!("{e:?}");
        eprintln!("pjsync: an unexpected error occurred");
        std::process::exit(1);
    }

    // Exit without waiting out the runtime: a console read still pending on
    // the blocking pool would otherwise stall shutdown indefinitely.
    std::process::exit(0);
}
