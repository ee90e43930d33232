//! Captures formatted log lines so middleware tests can assert on them.

use std::io;
use std::sync::{Arc, Mutex};

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Sends every event on this thread to the returned buffer until the
    /// guard drops. `#[tokio::test]` runs on one thread, so awaited futures
    /// are covered too.
    pub(crate) fn install() -> (Self, DefaultGuard) {
        let logs = Self::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        );
        (logs, tracing::subscriber::set_default(subscriber))
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).lines().map(str::to_owned).collect()
    }

    /// The single line whose message is `message`.
    pub(crate) fn line(&self, message: &str) -> String {
        let needle = format!(": {message}");
        let found: Vec<_> = self.lines().into_iter().filter(|l| l.contains(&needle)).collect();
        assert_eq!(found.len(), 1, "expected one `{message}` line in {:#?}", self.lines());
        found.into_iter().next().unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
