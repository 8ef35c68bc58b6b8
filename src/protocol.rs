use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::{ConnectError, CycleError, ProtocolError};

pub const IDLE: &str = "idle";
pub const STATUS: &str = "status";

/// Opens raw streams to the daemon.
pub trait Connector {
    type Stream: AsyncRead + AsyncWrite + Unpin;

    async fn connect(&self) -> Result<Self::Stream, ConnectError>;
}

pub struct TcpConnector {
    host: String,
    port: u16,
}

impl TcpConnector {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self) -> Result<TcpStream, ConnectError> {
        TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|source| ConnectError {
                endpoint: format!("{}:{}", self.host, self.port),
                source,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    Success,
    Failure,
}

impl Terminator {
    fn parse(line: &str) -> Option<Self> {
        if line.starts_with("+ ") {
            Some(Self::Success)
        } else if line.starts_with("- ") {
            Some(Self::Failure)
        } else {
            None
        }
    }
}

/// `Name: Value` lines of one response, without the terminator.
#[derive(Debug)]
pub struct Block {
    pub lines: Vec<String>,
    pub terminator: Terminator,
}

pub struct Connection<S> {
    stream: BufReader<S>,
    greeting: String,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Connects and consumes the greeting line the daemon sends first.
    pub async fn open<C>(connector: &C) -> Result<Self, CycleError>
    where
        C: Connector<Stream = S>,
    {
        let mut connection = Self {
            stream: BufReader::new(connector.connect().await?),
            greeting: String::new(),
        };
        connection.greeting = connection.read_line().await?.trim().to_string();

        Ok(connection)
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub async fn send_command(&mut self, command: &str) -> Result<(), ProtocolError> {
        debug!("Sending {command:?}");
        self.stream
            .write_all(format!("{command}\n").as_bytes())
            .await?;
        self.stream.flush().await?;

        Ok(())
    }

    /// Resolves once data is available without consuming it, so it can be
    /// raced against a timeout.
    pub async fn wait_readable(&mut self) -> Result<(), ProtocolError> {
        if self.stream.fill_buf().await?.is_empty() {
            return Err(ProtocolError::Closed);
        }

        Ok(())
    }

    pub async fn read_status_block(&mut self) -> Result<Block, ProtocolError> {
        let mut lines = Vec::new();
        loop {
            let raw = self.read_line().await?;
            let line = raw.trim();
            if let Some(terminator) = Terminator::parse(line) {
                debug!("Read block of {} lines", lines.len());
                return Ok(Block { lines, terminator });
            }

            if !line.contains(": ") {
                return Err(ProtocolError::MalformedLine(line.to_string()));
            }
            lines.push(line.to_string());
        }
    }

    pub async fn close(mut self) {
        if let Err(e) = self.stream.get_mut().shutdown().await {
            debug!("Failed to shut down connection cleanly: {e}");
        }
    }

    /// Invalid UTF-8 from the daemon is replaced rather than rejected.
    async fn read_line(&mut self) -> Result<String, ProtocolError> {
        let mut buf = Vec::new();
        if self.stream.read_until(b'\n', &mut buf).await? == 0 {
            return Err(ProtocolError::Closed);
        }
        let line = String::from_utf8_lossy(&buf);

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::testing::ScriptedConnector;
    use super::*;

    #[tokio::test]
    async fn open_consumes_greeting() {
        let connector = ScriptedConnector::default();
        let mut daemon = connector.accept();
        daemon.write_all(b"spop 0.0.1\n+ OK\n").await.unwrap();

        let mut connection = Connection::open(&connector).await.unwrap();

        assert_eq!(connection.greeting(), "spop 0.0.1");
        let block = connection.read_status_block().await.unwrap();
        assert!(block.lines.is_empty());
        assert_eq!(block.terminator, Terminator::Success);
    }

    #[tokio::test]
    async fn open_fails_when_refused() {
        let connector = ScriptedConnector::default();
        connector.refuse();

        let result = Connection::open(&connector).await;

        assert!(matches!(result, Err(CycleError::Connect(_))));
    }

    #[tokio::test]
    async fn reads_lines_until_terminator() {
        let connector = ScriptedConnector::default();
        let mut daemon = connector.accept();
        daemon
            .write_all(b"spop 0.0.1\nStatus: playing\r\nTitle: Track: Remix\n- failed\nTitle: next\n")
            .await
            .unwrap();
        let mut connection = Connection::open(&connector).await.unwrap();

        let block = connection.read_status_block().await.unwrap();

        assert_eq!(block.lines, ["Status: playing", "Title: Track: Remix"]);
        assert_eq!(block.terminator, Terminator::Failure);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let connector = ScriptedConnector::default();
        let mut daemon = connector.accept();
        daemon
            .write_all(b"spop 0.0.1\nTitle: Caf\xe9\n+ OK\n")
            .await
            .unwrap();
        let mut connection = Connection::open(&connector).await.unwrap();

        let block = connection.read_status_block().await.unwrap();

        assert_eq!(block.lines, ["Title: Caf\u{fffd}"]);
    }

    #[tokio::test]
    async fn indented_terminator_ends_block() {
        let connector = ScriptedConnector::default();
        let mut daemon = connector.accept();
        daemon
            .write_all(b"spop 0.0.1\nStatus: paused\n  + OK\n")
            .await
            .unwrap();
        let mut connection = Connection::open(&connector).await.unwrap();

        let block = connection.read_status_block().await.unwrap();

        assert_eq!(block.lines, ["Status: paused"]);
        assert_eq!(block.terminator, Terminator::Success);
    }

    #[tokio::test]
    async fn closing_mid_block_is_an_error() {
        let connector = ScriptedConnector::default();
        let mut daemon = connector.accept();
        daemon
            .write_all(b"spop 0.0.1\nStatus: playing\nTitle: cut")
            .await
            .unwrap();
        drop(daemon);
        let mut connection = Connection::open(&connector).await.unwrap();

        let result = connection.read_status_block().await;

        assert!(matches!(result, Err(ProtocolError::Closed)));
    }

    #[tokio::test]
    async fn malformed_line_is_an_error() {
        let connector = ScriptedConnector::default();
        let mut daemon = connector.accept();
        daemon
            .write_all(b"spop 0.0.1\nStatus playing\n+ OK\n")
            .await
            .unwrap();
        let mut connection = Connection::open(&connector).await.unwrap();

        let result = connection.read_status_block().await;

        assert!(matches!(result, Err(ProtocolError::MalformedLine(line)) if line == "Status playing"));
    }

    #[tokio::test]
    async fn commands_are_newline_terminated() {
        let connector = ScriptedConnector::default();
        let mut daemon = connector.accept();
        daemon.write_all(b"spop 0.0.1\n").await.unwrap();
        let mut connection = Connection::open(&connector).await.unwrap();

        connection.send_command(IDLE).await.unwrap();
        connection.send_command(STATUS).await.unwrap();
        connection.close().await;

        let mut sent = String::new();
        daemon.read_to_string(&mut sent).await.unwrap();
        assert_eq!(sent, "idle\nstatus\n");
    }

    #[tokio::test(start_paused = true)]
    async fn wait_readable_does_not_consume() {
        let connector = ScriptedConnector::default();
        let mut daemon = connector.accept();
        daemon.write_all(b"spop 0.0.1\n").await.unwrap();
        let mut connection = Connection::open(&connector).await.unwrap();

        let pending =
            tokio::time::timeout(Duration::from_secs(1), connection.wait_readable()).await;
        assert!(pending.is_err());

        daemon.write_all(b"Status: paused\n+ OK\n").await.unwrap();
        connection.wait_readable().await.unwrap();
        let block = connection.read_status_block().await.unwrap();
        assert_eq!(block.lines, ["Status: paused"]);

        drop(daemon);
        assert!(matches!(
            connection.wait_readable().await,
            Err(ProtocolError::Closed)
        ));
    }
}
