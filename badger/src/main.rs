mod config;
mod logging;
mod metrics;

use clap::{Args, Parser};
use config::Config;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about = "Snyk vulnerability badges")]
enum CliCommand {
    /// Serve badges
    Serve(ConfigArgs),
    /// Load and validate the configuration, then exit
    CheckConfig(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// YAML config file. Without it, configuration comes from the environment.
    #[arg(long)]
    config_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = CliCommand::parse();

    let (CliCommand::Serve(args) | CliCommand::CheckConfig(args)) = &cli;
    let config = match Config::load(args.config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match cli {
        CliCommand::Serve(_) => serve(config),
        CliCommand::CheckConfig(_) => {
            println!("Config OK");
            ExitCode::SUCCESS
        }
    }
}

fn serve(config: Config) -> ExitCode {
    let _sentry = logging::init(&config.logging);

    if let Some(metrics_config) = &config.metrics {
        if let Err(e) = metrics::init(metrics_config) {
            tracing::error!(error = %e, "Could not set up metrics");
            return ExitCode::FAILURE;
        }
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "Could not start the runtime");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting badger");
    match rt.block_on(badge_service::run(config.badge_service)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Badge service stopped");
            ExitCode::FAILURE
        }
    }
}
