use crate::model::GenericError;
use clap::Parser;
use common::config::Config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "config/pipeline.yaml")]
    pub config: String,
}

pub fn initialize_executable() -> Result<Config, GenericError> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    Ok(config)
}

/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
