mod awesome;
mod notification;

pub use awesome::AwesomeWidget;
pub use notification::DesktopNotification;

use crate::error::SinkError;
use crate::render::Rendering;

pub trait DisplaySink {
    async fn display(&mut self, text: &str) -> Result<(), SinkError>;

    /// Drops any cached handle so the next `display` recreates it.
    fn reset(&mut self);
}

/// The status bar and popup sinks, owned by the watcher.
pub struct SinkRegistry<A, B> {
    status_bar: A,
    popup: B,
}

impl<A: DisplaySink, B: DisplaySink> SinkRegistry<A, B> {
    pub fn new(status_bar: A, popup: B) -> Self {
        Self { status_bar, popup }
    }

    /// Failures are logged per sink and never propagated.
    pub async fn dispatch(&mut self, rendering: &Rendering) {
        if let Err(e) = self.status_bar.display(&rendering.status).await {
            warn!("Failed to update the status bar: {e}");
        }

        if let Some(text) = &rendering.notification {
            if let Err(e) = self.popup.display(text).await {
                warn!("Failed to show the notification: {e}");
            }
        }
    }

    pub fn reset(&mut self) {
        self.status_bar.reset();
        self.popup.reset();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::DisplaySink;
    use crate::error::SinkError;

    #[derive(Default)]
    pub struct Record {
        pub shown: Vec<String>,
        pub attempts: usize,
        pub resets: usize,
    }

    /// Remembers what it was asked to display; optionally fails every call.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        pub record: Arc<Mutex<Record>>,
        pub failing: bool,
    }

    impl RecordingSink {
        pub fn failing() -> Self {
            Self {
                failing: true,
                ..Self::default()
            }
        }
    }

    impl DisplaySink for RecordingSink {
        async fn display(&mut self, text: &str) -> Result<(), SinkError> {
            let mut record = self.record.lock().unwrap();
            record.attempts += 1;
            if self.failing {
                return Err(zbus::Error::Failure("recording sink".to_string()).into());
            }
            record.shown.push(text.to_string());
            Ok(())
        }

        fn reset(&mut self) {
            self.record.lock().unwrap().resets += 1;
        }
    }
}
