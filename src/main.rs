use clap::Parser;
use gofinances::args::{Args, Command};
use gofinances::{commands, Config, IntoResult, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().gofinances_home().path();

    // When GOFINANCES_IN_TEST_MODE is set and non-empty the identity providers are replaced with
    // fakes that never touch the network.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(
            home,
            init_args.client_id(),
            init_args.client_secret(),
            init_args.locale(),
        )
        .await?
        .print(),

        Command::SignIn(sign_in_args) => {
            let config = load(home).await?;
            commands::sign_in(&config, mode, sign_in_args.provider())
                .await?
                .print()
        }

        Command::SignOut => commands::sign_out(&load(home).await?, mode).await?.print(),

        Command::Whoami => commands::whoami(&load(home).await?, mode).await?.print(),

        Command::Dashboard => commands::dashboard(&load(home).await?, mode).await?.print(),

        Command::Import(import_args) => {
            let config = load(home).await?;
            commands::import(&config, mode, import_args.file())
                .await?
                .print()
        }
    };
    Ok(())
}

async fn load(home: &std::path::Path) -> Result<Config> {
    Config::load(home).await.pub_result(gofinances::ErrorType::Config)
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        // Without RUST_LOG only this crate logs, at the requested level.
        None => EnvFilter::new(format!(
            "{}={},{}={}",
            env!("CARGO_CRATE_NAME"),
            level,
            env!("CARGO_BIN_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
