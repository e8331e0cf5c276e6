use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::time::{self, Instant};
use tracing_subscriber::layer::SubscriberExt;

use connvisor::{
    ConnectConfig, ConnectError, ConnectionSupervisor, ConnectorFn, Event, EventKind, LogWriter,
    Subscribe, SupervisorConfig, TcpConnection,
};

/// Collects JSON log lines written through `tracing`.
#[derive(Clone, Default)]
struct LogCapture {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(self.clone())
            .json()
            .with_ansi(false)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_current_span(false)
            .flatten_event(true);

        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::set_default(subscriber)
    }

    fn records(&self) -> Vec<Value> {
        let guard = self
            .bytes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        String::from_utf8_lossy(&guard)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn with_message(&self, message: &str) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter(|r| r["message"] == message)
            .collect()
    }
}

struct LogCaptureWriter {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogCaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogCaptureWriter {
            bytes: Arc::clone(&self.bytes),
        }
    }
}

#[tokio::test]
async fn log_writer_levels_and_fields() {
    let capture = LogCapture::default();
    let _guard = capture.install();
    let writer = LogWriter::new();

    writer
        .on_event(
            &Event::new(EventKind::ConnectFailed)
                .with_target("mongodb://db:27017")
                .with_attempt(2)
                .with_reason("connection refused"),
        )
        .await;
    writer
        .on_event(
            &Event::new(EventKind::RetriesExhausted)
                .with_target("mongodb://db:27017")
                .with_attempt(10),
        )
        .await;
    writer
        .on_event(&Event::new(EventKind::ShutdownCompleted).with_target("mongodb://db:27017"))
        .await;

    let records = capture.records();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0]["level"], "WARN");
    assert_eq!(records[0]["message"], "connect failed");
    assert_eq!(records[0]["target_id"], "mongodb://db:27017");
    assert_eq!(records[0]["attempt"], 2);
    assert_eq!(records[0]["error"], "connection refused");

    assert_eq!(records[1]["level"], "ERROR");
    assert_eq!(records[1]["attempts"], 10);

    assert_eq!(records[2]["level"], "INFO");
    assert_eq!(records[2]["target_id"], "mongodb://db:27017");
}

#[tokio::test(start_paused = true)]
async fn unreachable_target_logs_each_failure_once() {
    let capture = LogCapture::default();
    let _guard = capture.install();

    let refuse = ConnectorFn::new(|cfg: ConnectConfig| async move {
        Err::<TcpConnection, _>(ConnectError::transient(cfg.target(), "connection refused"))
    });
    let sup = ConnectionSupervisor::builder(refuse, ConnectConfig::new("mongodb://app:pw@db:27017"))
        .with_config(SupervisorConfig::fixed(3, Duration::from_millis(5)))
        .with_subscriber(Arc::new(LogWriter::new()))
        .build();

    assert!(!sup.connect().await);

    let deadline = Instant::now() + Duration::from_secs(1);
    while capture.with_message("retries exhausted; datastore unavailable").is_empty()
        && Instant::now() < deadline
    {
        time::sleep(Duration::from_millis(1)).await;
    }

    let failures = capture.with_message("connect failed");
    assert_eq!(failures.len(), 3);
    for (i, record) in failures.iter().enumerate() {
        assert_eq!(record["level"], "WARN");
        assert_eq!(record["target_id"], "mongodb://db:27017");
        assert_eq!(record["attempt"], i as u64 + 1);
    }

    let errors: Vec<Value> = capture
        .records()
        .into_iter()
        .filter(|r| r["level"] == "ERROR")
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["attempts"], 3);

    assert!(capture.records().iter().all(|r| !r.to_string().contains("pw@")));
}
