use std::path::Path;
use std::time::Duration;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use serde::Deserialize;

fn default_port() -> u16 {
    6602
}

fn default_host() -> String {
    String::from("localhost")
}

fn default_poll_time() -> u64 {
    1
}

const MIN_POLL_TIME: u64 = 1;

fn default_retry_delay() -> u64 {
    5
}

fn default_widget() -> String {
    String::from("tb_spop")
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(
        short = 'H',
        long,
        help = "Host of the spop daemon. Defaults to \"localhost\" if not specified."
    )]
    host: Option<String>,

    #[clap(
        short,
        long,
        help = "Port of the spop daemon. Defaults to 6602 if not specified."
    )]
    port: Option<u16>,

    #[clap(long, help = "Seconds between two status polls when nothing changes.")]
    poll_time: Option<u64>,

    #[clap(long, help = "Seconds to wait before reconnecting after a failure.")]
    retry_delay: Option<u64>,

    #[clap(long, help = "Name of the awesome textbox showing the status.")]
    widget: Option<String>,

    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}

#[derive(Deserialize, Debug, PartialEq)]
struct Toml {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_poll_time")]
    poll_time: u64,
    #[serde(default = "default_retry_delay")]
    retry_delay: u64,
    #[serde(default = "default_widget")]
    widget: String,
}

impl Default for Toml {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            poll_time: default_poll_time(),
            retry_delay: default_retry_delay(),
            widget: default_widget(),
        }
    }
}

impl Toml {
    pub fn new() -> Self {
        let Some(config_dir) = dirs::config_local_dir() else {
            warn!("Impossible to find config directory, using default config");
            return Toml::default();
        };
        Self::load(&config_dir.join(env!("CARGO_PKG_NAME").to_string() + ".toml"))
    }

    fn load(file: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(file) else {
            debug!("No config file at {}, using defaults", file.display());
            return Toml::default();
        };
        toml::from_str(&content).unwrap_or_else(|e| {
            warn!(
                "Failed to parse config file {}, using defaults: {e}",
                file.display()
            );
            Toml::default()
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub poll_time: Duration,
    pub retry_delay: Duration,
    pub widget: String,
}

impl Config {
    pub fn new(cli: Cli) -> Self {
        Self::merge(cli, Toml::new())
    }

    fn merge(cli: Cli, toml_data: Toml) -> Self {
        let mut poll_time = cli.poll_time.unwrap_or(toml_data.poll_time);
        if poll_time < MIN_POLL_TIME {
            warn!("Poll time of {poll_time}s is too short, using {MIN_POLL_TIME}s");
            poll_time = MIN_POLL_TIME;
        }

        Config {
            host: cli.host.unwrap_or(toml_data.host),
            port: cli.port.unwrap_or(toml_data.port),
            poll_time: Duration::from_secs(poll_time),
            retry_delay: Duration::from_secs(cli.retry_delay.unwrap_or(toml_data.retry_delay)),
            widget: cli.widget.unwrap_or(toml_data.widget),
        }
    }
}
