use std::process::ExitCode;

use clap::Parser;
use tcbot::{cli::Cli, telegram::Telegram, ExponentialBackoff};
use tcbot_core::{Context, Operators, Session};
use tcbot_sim::{ip::SystemInterfaces, tc::TcShaper};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let mut context = Context::new(SystemInterfaces, TcShaper::new(cli.tc_binary.as_str()))
        .with_operators(Operators::with_seed(cli.masters.iter().cloned()));

    if let Err(e) = context.refresh_inventory() {
        warn!(error = %e, "could not list interfaces at startup");
    }

    let transport = match Telegram::new(&cli.api_url, &cli.token, cli.poll_timeout()) {
        Ok(transport) => transport,
        Err(e) => {
            error!(error = %e, "failed to build the Telegram client");
            return ExitCode::FAILURE;
        }
    };

    let backoff =
        ExponentialBackoff::new(cli.retry_initial(), cli.retry_max_delay(), cli.retry_max);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    info!(operators = context.operators.len(), "starting tcbot");

    match tcbot::run(transport, Session::new(context), backoff, shutdown).await {
        Ok(_) => {
            info!("stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "stopped on error");
            ExitCode::FAILURE
        }
    }
}
