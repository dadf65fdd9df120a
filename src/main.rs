use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use std::sync::Arc;
use tracing::info;

use study_planner::cli::{self, Cli, Commands};
use study_planner::{Config, HttpTimetableClient, Profile, logging, tui, utils};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev keeps config and logs apart from the real ones
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // Logging goes first so config loading is traced; only the level is read here
    let config_log_level = Config::load_log_level(cli.config.as_deref(), profile);
    let data_dir = utils::get_data_dir(profile).ok_or_else(|| eyre!("Could not determine data directory"))?;
    let log_path = logging::setup_logging(&data_dir.join("logs"), cli.log_level.as_deref(), config_log_level.as_deref())?;

    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load_with_profile(profile)?,
    };
    if let Some(url) = cli.service_url {
        config.service.base_url = url;
    }
    info!(?profile, log = %log_path.display(), url = %config.service.endpoint_url(), "main: starting");

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let service = Arc::new(HttpTimetableClient::from_config(&config.service)?);

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = tui::App::new(config, service, runtime.handle().clone())?;
            tui::run_event_loop(app)?;
        }
        Commands::Generate { input, hours, json } => {
            runtime.block_on(cli::handle_generate(
                &input,
                hours,
                json,
                config.default_study_hours,
                service.as_ref(),
            ))?;
        }
    }

    Ok(())
}
