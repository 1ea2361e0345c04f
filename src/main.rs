use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use quake::{FileReporter, Reporter, Runner, StdoutReporter};

/// Declarative load-generation harness for REST and GraphQL APIs.
#[derive(Debug, Parser)]
#[command(name = "quake", version, about)]
struct Cli {
    /// Path to the JSON template describing the call to load-test.
    template: PathBuf,

    /// Where to write the report. Defaults to `result.json` next to the
    /// template.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the report to stdout.
    #[arg(long)]
    stdout: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let runner = Runner::from_file(&cli.template)?;
    let report = runner.run().await?;

    let output = cli.output.unwrap_or_else(|| {
        cli.template
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default()
            .join("result.json")
    });
    FileReporter::new(output).report(&report).await?;

    if cli.stdout {
        StdoutReporter.report(&report).await?;
    }
    Ok(())
}
