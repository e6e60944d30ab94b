use std::process::ExitCode;

use glsteps::{Config, Gpu, Result, logging};

use crate::app::App;

mod app;
mod demos;

/// Optional settings file, read from the working directory.
const CONFIG_PATH: &str = "glsteps.json";

fn main() -> ExitCode {
    let loaded = match Config::load(CONFIG_PATH) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let from_file = loaded.is_some();
    let config = loaded.unwrap_or_default();

    if let Err(e) = config.log_level().and_then(logging::init) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    if from_file {
        log::info!("Using settings from {CONFIG_PATH}");
    } else {
        log::info!("No {CONFIG_PATH} found, using defaults");
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<()> {
    let mut app = App::new(&config.window)?;
    log::info!("OpenGL {}", app.gl.version());
    log::info!("Running the {:?} demo", config.demo);

    demos::run(config, &mut app)
}
