//! Notifier adapter that records notices as tracing events.

use tracing::{info, warn};

use crate::domain::ports::{Notice, NoticeLevel, Notifier};

/// Emits each notice as a `notice` event: successes at info, errors at warn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// New notifier.
    pub const fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(target: "notice", message = %notice.message),
            NoticeLevel::Error => warn!(target: "notice", message = %notice.message),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use rstest::rstest;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buffer lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[rstest]
    fn notices_are_logged_with_their_level() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingNotifier::new().notify(Notice::success("Activity created successfully."));
            TracingNotifier::new().notify(Notice::error("404: Activity not found"));
        });

        let output = String::from_utf8(captured.0.lock().expect("buffer lock").clone())
            .expect("utf8 output");
        assert!(output.contains("INFO notice: Activity created successfully."));
        assert!(output.contains("WARN notice: 404: Activity not found"));
    }
}
