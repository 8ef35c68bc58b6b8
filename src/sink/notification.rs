use std::collections::HashMap;

use zbus::zvariant::Value;
use zbus::Connection;

use super::DisplaySink;
use crate::error::SinkError;

const DESTINATION: &str = "org.freedesktop.Notifications";
const PATH: &str = "/org/freedesktop/Notifications";
const INTERFACE: &str = "org.freedesktop.Notifications";

const APP_NAME: &str = "spop";
const SUMMARY: &str = "spop update";
const EXPIRE_TIMEOUT_MS: i32 = 8000;
const URGENCY_LOW: u8 = 0;

/// A single desktop popup, updated in place on every call.
#[derive(Default)]
pub struct DesktopNotification {
    connection: Option<Connection>,
    id: u32,
}

impl DesktopNotification {
    pub fn new() -> Self {
        Self::default()
    }

    async fn connection(&mut self) -> Result<Connection, SinkError> {
        if let Some(connection) = &self.connection {
            return Ok(connection.clone());
        }

        debug!("Opening session bus for notifications");
        let connection = Connection::session().await?;
        self.connection = Some(connection.clone());
        Ok(connection)
    }
}

impl DisplaySink for DesktopNotification {
    async fn display(&mut self, text: &str) -> Result<(), SinkError> {
        let connection = self.connection().await?;

        let mut hints: HashMap<&str, Value<'_>> = HashMap::new();
        hints.insert("urgency", Value::from(URGENCY_LOW));
        let actions: Vec<&str> = Vec::new();

        let reply = connection
            .call_method(
                Some(DESTINATION),
                PATH,
                Some(INTERFACE),
                "Notify",
                &(
                    APP_NAME,
                    self.id,
                    "",
                    SUMMARY,
                    text,
                    actions,
                    hints,
                    EXPIRE_TIMEOUT_MS,
                ),
            )
            .await?;
        // The server hands back the id to pass as `replaces_id` next time.
        self.id = reply.body().deserialize::<u32>()?;

        Ok(())
    }

    fn reset(&mut self) {
        self.connection = None;
        self.id = 0;
    }
}
