use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pcpgraph::{RunController, Settings, SshRunner};
use pcpgraph_adapters::HttpFetcher;
use pcpgraph_types::HostSet;

/// Directory under `--archive` receiving graphs and the report.
const GRAPHS_DIR: &str = "pcp_graphs";

#[derive(Parser, Debug)]
#[command(name = "pcpgraph")]
#[command(about = "Record PCP graphs and archives for the time window of a test run")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Record graphs while a command runs
    Run {
        #[command(flatten)]
        common: CommonArgs,

        /// Command to run, after `--`
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Record graphs for a window that has already passed
    Report {
        #[command(flatten)]
        common: CommonArgs,

        /// Window start, seconds since the epoch
        #[arg(long)]
        from: u64,

        /// Window end, seconds since the epoch
        #[arg(long)]
        until: u64,
    },
}

#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// Hosts taking part in the run (comma separated)
    #[arg(long, value_delimiter = ',', required = true)]
    hosts: Vec<String>,

    /// Path to a settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the PCP web host, overriding the settings
    #[arg(long)]
    pcp_host: Option<String>,

    /// Run archive directory; graphs and the report go to <DIR>/pcp_graphs
    #[arg(short, long, value_name = "DIR")]
    archive: Option<PathBuf>,

    /// Run identifier shown in the report
    #[arg(long)]
    run_id: Option<String>,

    /// Print the graph records as JSON when done
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Cmd::Run { common, command } => run_command(&common, &command),
        Cmd::Report {
            common,
            from,
            until,
        } => record_window(&common, from, until),
    }
}

fn run_command(common: &CommonArgs, command: &[String]) -> Result<()> {
    let mut controller = build_controller(common)?;
    controller.begin()?;

    info!("Running: {}", command.join(" "));
    let status = Command::new(&command[0]).args(&command[1..]).status();

    // The final report is written whatever happened to the command
    controller.end()?;
    print_records(common, &controller)?;

    let status = status.with_context(|| format!("Failed to run {}", command[0]))?;
    if !status.success() {
        bail!("{} exited with {}", command.join(" "), status);
    }
    Ok(())
}

fn record_window(common: &CommonArgs, from: u64, until: u64) -> Result<()> {
    let mut controller = build_controller(common)?;
    controller.begin_at(from)?;
    controller.end_at(until)?;
    print_records(common, &controller)
}

fn build_controller(common: &CommonArgs) -> Result<RunController<HttpFetcher, SshRunner>> {
    let mut settings = Settings::load(common.config.as_deref())?;
    if let Some(pcp_host) = &common.pcp_host {
        settings.pcp_host = Some(pcp_host.clone());
    }

    let hosts = HostSet::new(&common.hosts).context("Invalid --hosts")?;
    let fetcher = HttpFetcher::builder()
        .timeout(settings.fetch_timeout())
        .build()
        .context("Failed to create HTTP client")?;

    let out_dir = match &common.archive {
        Some(archive) => {
            let dir = archive.join(GRAPHS_DIR);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            Some(dir)
        }
        None => None,
    };

    Ok(RunController::new(hosts, fetcher, SshRunner::new())
        .with_backends(settings.backends()?)
        .with_archives(
            settings.archive_extractor(),
            settings.archive_output_dir.clone(),
        )
        .with_out_dir(out_dir)
        .with_run_id(common.run_id.clone()))
}

fn print_records(
    common: &CommonArgs,
    controller: &RunController<HttpFetcher, SshRunner>,
) -> Result<()> {
    if common.json {
        let json = serde_json::to_string_pretty(controller.graphs().records())?;
        println!("{}", json);
    }
    Ok(())
}
