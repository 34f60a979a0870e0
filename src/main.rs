use std::process;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use kubedev::cli::{self, Cli, Commands};
use kubedev::config::Settings;
use kubedev::provider::ProviderRegistry;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Initialize logging
    let filter = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    // Load .env file: an explicit path must exist, the implicit one is optional
    if let Some(ref env_file) = args.env_file {
        if let Err(e) = dotenvy::from_path(env_file) {
            error!("Failed to load env file {}: {}", env_file.display(), e);
            process::exit(1);
        }
    } else {
        let _ = dotenvy::dotenv();
    }

    // Environment wins over .env file, which wins over defaults
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&args.command, &settings).await {
        error!("{}", e);
        process::exit(1);
    }
}

async fn run(command: &Commands, settings: &Settings) -> Result<(), anyhow::Error> {
    match command {
        Commands::Prerequisites => {
            cli::prerequisites(settings).await?;
            info!("host prerequisites installed");
        }
        Commands::ContainerRuntime => {
            cli::container_runtime(settings).await?;
            info!("container engine '{}' installed", settings.container_engine);
        }
        Commands::Up | Commands::Down | Commands::Restart | Commands::Other(_) => {
            if let Commands::Other(rest) = command {
                warn!(
                    "unrecognized command '{}', defaulting to 'up'",
                    rest.first().map(String::as_str).unwrap_or("")
                );
            }

            let registry = ProviderRegistry::new();
            let provider = registry.get(&settings.provider)?;

            println!(
                "{}",
                cli::format_summary(settings, &provider.describe(settings))
            );

            match command {
                Commands::Down => cli::down(provider.as_ref(), settings).await?,
                Commands::Restart => cli::restart(provider.as_ref(), settings).await?,
                _ => cli::up(provider.as_ref(), settings).await?,
            }
        }
    }
    Ok(())
}
