mod cli;
mod config;
mod sheet;
mod store;
mod sync;

use clap::Parser;
use env_logger::Env;
use log::{debug, error};

use cli::Cli;

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // .env must be loaded before the logger reads RUST_LOG
    let env_result = match &cli.env_file {
        Some(path) => dotenvy::from_path(path).map(|_| Some(path.clone())),
        None => dotenvy::dotenv().map(Some).or_else(|e| {
            if e.not_found() { Ok(None) } else { Err(e) }
        }),
    };

    init_logging(cli.verbose);

    match env_result {
        Ok(Some(path)) => debug!("Loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            error!("Failed to load environment file: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = cli::dispatch(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
