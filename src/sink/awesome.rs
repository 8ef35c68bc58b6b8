use zbus::Connection;

use super::DisplaySink;
use crate::error::SinkError;

const DESTINATION: &str = "org.naquadah.awesome.awful";
const PATH: &str = "/";
const INTERFACE: &str = "org.naquadah.awesome.awful.Remote";
const METHOD: &str = "Eval";

/// Sets the text of an awesome textbox through the window manager's remote
/// Lua evaluator.
pub struct AwesomeWidget {
    widget: String,
    connection: Option<Connection>,
}

impl AwesomeWidget {
    pub fn new(widget: &str) -> Self {
        Self {
            widget: widget.to_string(),
            connection: None,
        }
    }

    async fn connection(&mut self) -> Result<Connection, SinkError> {
        if let Some(connection) = &self.connection {
            return Ok(connection.clone());
        }

        debug!("Opening session bus for the awesome widget");
        let connection = Connection::session().await?;
        self.connection = Some(connection.clone());
        Ok(connection)
    }
}

impl DisplaySink for AwesomeWidget {
    async fn display(&mut self, text: &str) -> Result<(), SinkError> {
        let code = lua_assignment(&self.widget, text);
        let connection = self.connection().await?;

        connection
            .call_method(Some(DESTINATION), PATH, Some(INTERFACE), METHOD, &(code,))
            .await?;

        Ok(())
    }

    fn reset(&mut self) {
        self.connection = None;
    }
}

fn lua_assignment(widget: &str, text: &str) -> String {
    format!("{widget}.text = \"{} \"\n", lua_escape(text))
}

/// Escapes for a double-quoted Lua string; other control characters use
/// Lua's decimal `\ddd` form.
fn lua_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_ascii_control() => escaped.push_str(&format!("\\{:03}", u32::from(c))),
            c => escaped.push(c),
        }
    }
    escaped
}
