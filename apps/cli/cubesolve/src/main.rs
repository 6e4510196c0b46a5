use cubesolve::camera::open_devices;
use cubesolve::console;
use cubesolve::error::CubesolveError;
use cubesolve::logger::initialize as LoggerInitialize;
use cubesolve::settings;

use session_core::session::spawn_session;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;

use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{}", e.message());
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CubesolveError> {
    // Before settings, so .env can override directories and the service URL
    let dotenv = settings::load_dotenv();
    let settings = settings::load()?;

    create_dir_all(&settings.log_dir).map_err(|e| CubesolveError::Cubesolve {
        message: format!(
            "Failed to create log directory {}: {e}",
            settings.log_dir.display()
        ),
        location: ErrorLocation::from(Location::caller()),
    })?;

    LoggerInitialize(&settings.log_dir)?;

    info!("cubesolve starting");
    info!("Log directory: {}", settings.log_dir.display());
    info!("Config directory: {}", settings.config_dir.display());
    if let Some(path) = dotenv {
        info!("Environment loaded from {}", path.display());
    }

    let devices = open_devices(settings.camera_image.as_deref())?;
    let handle = spawn_session(settings.config, devices).map_err(CubesolveError::core)?;

    handle.connect().map_err(CubesolveError::core)?;
    println!("{}", console::HELP);

    console::run(handle).await?;

    info!("cubesolve exiting");
    Ok(())
}
