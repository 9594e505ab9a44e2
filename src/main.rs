use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use quanta_shell::config::{FsConfig, OutputFormat, SchedulerConfig, ShellConfig};
use quanta_shell::fs::FileTree;
use quanta_shell::scheduler::Scheduler;
use quanta_shell::shell::{run_batch, run_interactive, Dispatcher};
use quanta_shell::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "quanta-shell")]
#[command(version)]
#[command(about = "A round-robin job shell with an in-memory file tree")]
struct Args {
    /// File of newline-separated commands. Without it, an interactive prompt is started.
    batch_file: Option<PathBuf>,

    /// Length of one scheduling time slice, in milliseconds
    #[arg(long, default_value = "2000")]
    quantum_ms: u64,

    /// Pause between two time slices, in milliseconds
    #[arg(long, default_value = "5000")]
    delay_ms: u64,

    /// Interpreter used to run job command lines
    #[arg(long, default_value = "/bin/sh")]
    shell: PathBuf,

    /// Discard job stdout/stderr instead of sharing the terminal
    #[arg(long)]
    quiet_jobs: bool,

    /// Cascade directory renames, reject duplicate names, allow rmdir at any depth
    #[arg(long)]
    strict_fs: bool,

    /// Output format for listings and info replies
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

impl Args {
    fn shell_config(&self) -> ShellConfig {
        let scheduler = SchedulerConfig::new(self.quantum_ms, self.delay_ms)
            .with_shell(self.shell.clone())
            .with_inherit_output(!self.quiet_jobs);
        let fs = if self.strict_fs {
            FsConfig::strict()
        } else {
            FsConfig::default()
        };
        ShellConfig::new(scheduler)
            .with_fs(fs)
            .with_output(self.output)
    }
}

async fn run_batch_mode(
    dispatcher: &Dispatcher,
    path: &Path,
    token: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = run_batch(dispatcher, path, &mut std::io::stdout()).await?;
    tracing::info!(
        commands = report.commands,
        jobs = report.jobs.len(),
        errors = report.errors,
        "Batch submitted, waiting for jobs"
    );

    tokio::select! {
        _ = dispatcher.scheduler().wait_for_all() => {
            tracing::info!("All batch jobs finished");
        }
        _ = token.cancelled() => {
            tracing::warn!(
                outstanding = dispatcher.scheduler().outstanding().await,
                "Interrupted before all jobs finished"
            );
        }
    }
    Ok(())
}

async fn run_interactive_mode(
    dispatcher: &Dispatcher,
    token: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = BufReader::new(tokio::io::stdin());
    let handled = run_interactive(dispatcher, stdin, &mut std::io::stdout(), token).await?;
    tracing::debug!(lines = handled, "Interactive session ended");
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.shell_config();
    tracing::debug!(?config, "Starting quanta-shell");

    let token = install_shutdown_handler();
    let scheduler = Scheduler::new(config.scheduler.clone());
    let tree = Arc::new(RwLock::new(FileTree::new(config.fs)));
    let dispatcher = Dispatcher::new(scheduler.clone(), tree, config.output);
    let scheduler_handle = scheduler.start(token.clone());

    let result = match &args.batch_file {
        Some(path) => run_batch_mode(&dispatcher, path, &token).await,
        None => run_interactive_mode(&dispatcher, &token).await,
    };

    // Stops the loop and kills any job still stopped between slices.
    token.cancel();
    if let Err(e) = scheduler_handle.await {
        tracing::error!(error = %e, "Scheduler task failed");
    }

    println!("Exiting Shell...");

    // Exit explicitly: a pending blocking read on stdin would otherwise keep
    // the runtime from shutting down.
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
