//! Command line and environment configuration.
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use log::LevelFilter;

const APP_DIR_NAME: &str = "tutor_chat";

#[derive(Debug, Parser)]
#[command(
    name = "tutor_chat",
    version,
    about = "Terminal chat client for the multi-agent tutoring backend"
)]
pub struct Cli {
    /// Base URL of the tutoring backend.
    #[arg(long, env = "TUTOR_SERVER", default_value = "http://localhost:8000")]
    pub server: String,

    /// Live-update socket URL. Defaults to the server's `/ws` endpoint.
    #[arg(long, env = "TUTOR_WS_URL")]
    pub ws_url: Option<String>,

    #[arg(long, env = "TUTOR_STUDENT_ID", default_value = tutor_core::DEFAULT_STUDENT_ID)]
    pub student_id: String,

    /// History poll interval in seconds; 0 disables polling.
    #[arg(long, default_value_t = 5)]
    pub poll_secs: u64,

    /// Pause before reconnecting the socket in seconds; 0 disables reconnects.
    #[arg(long, default_value_t = 3)]
    pub reconnect_secs: u64,

    /// Directory for credentials, speech clips and the log file.
    #[arg(long, env = "TUTOR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// off, error, warn, info, debug or trace.
    #[arg(long, env = "TUTOR_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server: String,
    pub ws_url: String,
    pub student_id: String,
    pub poll_interval: Option<Duration>,
    pub reconnect_delay: Option<Duration>,
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl Cli {
    pub fn into_config(self) -> anyhow::Result<AppConfig> {
        let server = self.server.trim().trim_end_matches('/').to_string();
        let ws_url = match self.ws_url {
            Some(url) => url.trim().to_string(),
            None => derive_ws_url(&server)?,
        };

        let student_id = self.student_id.trim().to_string();
        if student_id.is_empty() {
            bail!("--student-id must not be empty");
        }

        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR_NAME}"))),
        };
        let log_file = self
            .log_file
            .unwrap_or_else(|| data_dir.join(format!("{APP_DIR_NAME}.log")));

        let log_level = match self.log_level.as_deref() {
            Some(raw) => engine_logging::parse_level(raw)
                .with_context(|| format!("unknown log level {raw:?}"))?,
            None => engine_logging::default_level(),
        };

        Ok(AppConfig {
            server,
            ws_url,
            student_id,
            poll_interval: seconds(self.poll_secs),
            reconnect_delay: seconds(self.reconnect_secs),
            data_dir,
            log_file,
            log_level,
        })
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn derive_ws_url(server: &str) -> anyhow::Result<String> {
    if let Some(rest) = server.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/ws"));
    }
    if let Some(rest) = server.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/ws"));
    }
    bail!("--server must start with http:// or https://, got {server:?}")
}
