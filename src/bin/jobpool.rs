//! jobpool CLI: transform files in parallel through an external program.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use jobpool::config::{Config, PoolFile, requested_threads};
use jobpool::engine::{CommandEngine, CommandSpec};
use jobpool::job::Job;
use jobpool::report::RunReport;
use jobpool::strategy;
use jobpool::telemetry::{TelemetryConfig, init_telemetry};
use jobpool::threads::{HostCapacity, SystemCapacity, resolve_thread_count};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jobpool", about = "Run independent transform jobs on a bounded worker pool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transform source files and print a JSON run report
    Run {
        /// Source files, one job each
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// TOML pool file with [pool] and [engine] tables
        #[arg(long)]
        config: Option<PathBuf>,
        /// Requested worker threads (clamped to available processors)
        #[arg(long, allow_negative_numbers = true)]
        threads: Option<i64>,
        /// Program that reads a source on stdin and writes the result to stdout
        #[arg(long)]
        command: Option<PathBuf>,
        /// Argument passed to the program (repeatable)
        #[arg(long = "arg")]
        args: Vec<String>,
        /// Output directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Replacement extension for outputs
        #[arg(long)]
        extension: Option<String>,
    },
    /// Print the thread count a request resolves to on this host
    Threads {
        #[arg(allow_negative_numbers = true)]
        requested: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let env = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: env.otel_endpoint.clone(),
        service_name: "jobpool".to_string(),
        default_filter: env.log_level.clone(),
    })?;

    match cli.command {
        Command::Run {
            sources,
            config,
            threads,
            command,
            args,
            out_dir,
            extension,
        } => {
            let file = config.as_deref().map(PoolFile::load).transpose()?;
            let spec = engine_spec(file.as_ref(), command, args, out_dir, extension)?;
            let requested = requested_threads(threads, &env, file.as_ref());
            cmd_run(sources, spec, requested).await
        }
        Command::Threads { requested } => {
            println!("{}", resolve_thread_count(requested, SystemCapacity.available()));
            Ok(())
        }
    }
}

/// Merge CLI flags over the file's `[engine]` table.
fn engine_spec(
    file: Option<&PoolFile>,
    command: Option<PathBuf>,
    args: Vec<String>,
    out_dir: Option<PathBuf>,
    extension: Option<String>,
) -> anyhow::Result<CommandSpec> {
    let base = file.and_then(|f| f.engine.clone());

    let command = command
        .or_else(|| base.as_ref().map(|b| b.command.clone()))
        .context("no engine command: pass --command or set [engine] command")?;
    let out_dir = out_dir
        .or_else(|| base.as_ref().map(|b| b.out_dir.clone()))
        .context("no output directory: pass --out-dir or set [engine] out_dir")?;
    let args = if args.is_empty() {
        base.as_ref().map(|b| b.args.clone()).unwrap_or_default()
    } else {
        args
    };
    let extension = extension.or_else(|| base.and_then(|b| b.extension));

    Ok(CommandSpec {
        command,
        args,
        out_dir,
        extension,
    })
}

async fn cmd_run(
    sources: Vec<PathBuf>,
    spec: CommandSpec,
    requested: Option<i64>,
) -> anyhow::Result<()> {
    let capacity = SystemCapacity;
    let requested = requested.unwrap_or(capacity.available() as i64);

    let jobs = sources
        .iter()
        .map(|p| Job::from_path(p))
        .collect::<Result<HashSet<Job>, _>>()?;
    spec.check_targets(&jobs)?;

    let factory = move || CommandEngine::new(&spec);
    let strategy = strategy::select(requested, jobs.len(), factory, &capacity);
    let threads = strategy.threads();

    let started_at = Utc::now();
    let results = tokio::task::spawn_blocking(move || strategy.execute(jobs))
        .await
        .context("pool task aborted")??;
    let finished_at = Utc::now();

    let report = RunReport::new(threads, started_at, finished_at, results);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
