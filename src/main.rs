#![warn(clippy::pedantic)]

mod config;
mod error;
mod protocol;
mod render;
mod sink;
mod status;
mod watcher;

use clap::Parser;
use config::{Cli, Config};
use protocol::TcpConnector;
use sink::{AwesomeWidget, DesktopNotification, SinkRegistry};
use tokio::signal;
use watcher::Watcher;

#[macro_use]
extern crate log;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbosity = cli.verbosity.log_level().unwrap_or(log::Level::Error);
    simple_logger::init_with_level(verbosity)?;

    let config = Config::new(cli);
    info!("Watching spop at {}:{}", config.host, config.port);

    let sinks = SinkRegistry::new(
        AwesomeWidget::new(&config.widget),
        DesktopNotification::new(),
    );
    let connector = TcpConnector::new(&config.host, config.port);
    let mut watcher = Watcher::new(connector, sinks, &config);

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = watcher.run() => { Ok(()) },
        () = ctrl_c => {
            info!("Interruption signal received");
            Ok(())
        },
        () = terminate => {
            info!("Terminate signal received");
            Ok(())
        },
    }
}
