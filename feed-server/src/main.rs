use clap::{Args, Parser, Subcommand};
use config::{Config, ConfigError};
use std::path::{Path, PathBuf};
use std::process;

mod config;
mod logging;
mod statsd;

#[derive(Parser)]
#[command(version, about = "Publishes a Notion database as a JSON media feed")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Start the feed and admin listeners
    Run(ConfigArgs),
    /// Check a configuration file and exit
    ValidateConfig(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long, default_value = "feed.yaml")]
    config_path: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Metrics(#[from] statsd::MetricsError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("feed stopped: {0}")]
    Feed(#[from] feed::FeedError),
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        CliCommand::Run(args) => run(&args.config_path),
        CliCommand::ValidateConfig(args) => validate(&args.config_path),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn validate(path: &Path) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    config.credential()?;
    println!("{} is valid", path.display());
    Ok(())
}

fn run(path: &Path) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    let _sentry = logging::init(config.common.logging.as_ref());

    if let Some(metrics_config) = &config.common.metrics {
        statsd::init(metrics_config)?;
    }

    let token = config.credential()?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(feed::run(config.feed, token));

    if let Err(e) = &result {
        tracing::error!(error = %e, "feed stopped");
    }
    Ok(result?)
}
