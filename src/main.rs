use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use slackline::core::config::{self, ConfigError};
use slackline::service::SlackService;
use slackline::tui;

#[derive(Parser)]
#[command(name = "slackline", about = "Keyboard-driven Slack client for the terminal")]
struct Args {
    /// Config file (defaults to <config dir>/slackline/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show the debug column and log at debug level
    #[arg(short, long)]
    debug: bool,

    /// Slack token; overrides SLACK_TOKEN and the config file
    #[arg(short, long)]
    token: Option<String>,
}

fn fail(msg: impl std::fmt::Display) -> ! {
    log::error!("{msg}");
    eprintln!("slackline: {msg}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to slackline.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Ok(log_file) = File::create("slackline.log") {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    log::info!("Slackline starting up");

    let path = match args.config.or_else(config::config_path) {
        Some(path) => path,
        None => fail(ConfigError::Invalid(
            "no config directory on this system, pass --config".to_string(),
        )),
    };
    let resolved = config::load_config(&path)
        .and_then(|file| config::resolve(&file, args.token.as_deref(), &path))
        .unwrap_or_else(|e| fail(e));

    let service = Arc::new(SlackService::new(resolved.slack_token.clone(), None));
    if let Err(e) = tui::run(resolved, service, args.debug).await {
        fail(e);
    }
}
