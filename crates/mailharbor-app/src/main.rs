mod cli;
mod commands;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let log_directive = args.log_level.as_deref().unwrap_or("mailharbor=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "mailharbor=info".parse().unwrap()),
            ),
        )
        .init();

    tracing::info!("MailHarbor v{} starting", env!("CARGO_PKG_VERSION"));

    let config_dir = match args.config_dir {
        Some(dir) => dir,
        None => match mailharbor_platform::paths::default_config_dir() {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
    };
    tracing::info!("using definitions from {}", config_dir.display());

    let result = match args.command {
        cli::Command::Run => commands::run(config_dir).await,
        cli::Command::Init => commands::init(config_dir).await,
        cli::Command::Check => commands::check(config_dir),
        cli::Command::HashPassword { password } => commands::hash_password(&password),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
