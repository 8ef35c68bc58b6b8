use std::convert::Infallible;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time;

use crate::config::Config;
use crate::error::{CycleError, ProtocolError};
use crate::protocol::{Connection, Connector, Terminator, IDLE, STATUS};
use crate::render::render;
use crate::sink::{DisplaySink, SinkRegistry};
use crate::status;

pub struct Watcher<C, A, B> {
    connector: C,
    sinks: SinkRegistry<A, B>,
    poll_time: Duration,
    retry_delay: Duration,
    last_failure: Option<DateTime<Local>>,
}

impl<C, A, B> Watcher<C, A, B>
where
    C: Connector,
    A: DisplaySink,
    B: DisplaySink,
{
    pub fn new(connector: C, sinks: SinkRegistry<A, B>, config: &Config) -> Self {
        Self {
            connector,
            sinks,
            poll_time: config.poll_time,
            retry_delay: config.retry_delay,
            last_failure: None,
        }
    }

    /// Watches the daemon forever, reconnecting after every failure.
    pub async fn run(&mut self) {
        loop {
            match self.watch().await {
                Ok(never) => match never {},
                Err(e) => self.recover(&e).await,
            }
        }
    }

    /// One connection cycle. Only returns on failure, after both connections
    /// have been closed.
    async fn watch(&mut self) -> Result<Infallible, CycleError> {
        let mut idle = Connection::open(&self.connector).await?;
        let mut active = match Connection::open(&self.connector).await {
            Ok(active) => active,
            Err(e) => {
                idle.close().await;
                return Err(e);
            }
        };

        match self.last_failure.take() {
            Some(since) => info!(
                "Connected to {} after {} seconds offline.",
                idle.greeting(),
                (Local::now() - since).num_seconds()
            ),
            None => info!("Connected to {}.", idle.greeting()),
        }

        let result = self.serve(&mut idle, &mut active).await;
        idle.close().await;
        active.close().await;

        result.map_err(CycleError::from)
    }

    async fn serve<S>(
        &mut self,
        idle: &mut Connection<S>,
        active: &mut Connection<S>,
    ) -> Result<Infallible, ProtocolError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        idle.send_command(IDLE).await?;
        active.send_command(STATUS).await?;
        self.refresh(active, true).await?;

        loop {
            if let Ok(ready) = time::timeout(self.poll_time, idle.wait_readable()).await {
                ready?;
                self.refresh(idle, true).await?;
                idle.send_command(IDLE).await?;
            } else {
                active.send_command(STATUS).await?;
                self.refresh(active, false).await?;
            }
        }
    }

    async fn refresh<S>(
        &mut self,
        connection: &mut Connection<S>,
        notify: bool,
    ) -> Result<(), ProtocolError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let block = connection.read_status_block().await?;
        // Both sentinels end a block; a failure one carries no status of note.
        if block.terminator == Terminator::Failure {
            debug!("Daemon ended the block with a failure sentinel");
        }
        let now_playing = status::parse(&block.lines)?;
        trace!("Status {now_playing:?}");

        self.sinks.dispatch(&render(&now_playing, notify)).await;
        Ok(())
    }

    async fn recover(&mut self, error: &CycleError) {
        error!("{error}");
        self.sinks.reset();
        if self.last_failure.is_none() {
            self.last_failure = Some(Local::now());
        }

        info!(
            "Trying again in {} seconds...",
            self.retry_delay.as_secs()
        );
        time::sleep(self.retry_delay).await;
    }
}
