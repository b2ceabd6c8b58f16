mod cli;

use clap::Parser;

use cli::{Args, Command};
use photobooth::config::Config;

/// Load the config file.
/// If --config is specified, the file must exist and parse.
/// Otherwise fall back to defaults when the default file is broken.
fn load_config(path: Option<&std::path::Path>) -> Config {
    match Config::load(path) {
        Ok(c) => c,
        Err(e) if path.is_some() => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Warning: Failed to load config file: {}", e);
            eprintln!("Using default settings.\n");
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config_path = args.config.as_deref();

    let result = match args.command {
        Command::ListCameras => {
            cli::list_cameras();
            Ok(())
        }
        Command::Config { action } => {
            cli::handle_config_action(action, config_path);
            Ok(())
        }
        Command::Shoot(shoot) => {
            let cfg = load_config(config_path);
            cli::run_shoot(shoot, &cfg).await
        }
        Command::Compose(compose) => {
            let cfg = load_config(config_path);
            cli::run_compose(compose, &cfg).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
