use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{error, warn};

use errlens_core::{extract_doctype, ErrorReport};

use crate::queue::{ExplainJob, JobQueue};

const LOGGING_OBSERVER_NAME: &str = "log";

/// A sink for intercepted errors. Observers must not assume any other
/// observer ran before them; a failing observer never blocks the rest.
#[async_trait]
pub trait ErrorObserver: Send + Sync {
    fn name(&self) -> &str;

    async fn on_error(&self, report: &ErrorReport) -> anyhow::Result<()>;
}

/// Writes every intercepted error to the log. Always installed first so a
/// broken downstream observer cannot lose the record.
pub struct LoggingObserver;

#[async_trait]
impl ErrorObserver for LoggingObserver {
    fn name(&self) -> &str {
        LOGGING_OBSERVER_NAME
    }

    async fn on_error(&self, report: &ErrorReport) -> anyhow::Result<()> {
        let snippet: String = report.raw_message.chars().take(200).collect();
        error!(
            target: "errlens::observe",
            doctype = report.doctype.as_deref().unwrap_or("unknown"),
            snippet = %snippet,
            "error intercepted"
        );
        Ok(())
    }
}

/// Hands the error to the background queue so an explanation is ready by
/// the time someone opens the error log. Doctype is recovered from the
/// traceback when the caller did not supply one.
pub struct QueueObserver {
    queue: Arc<dyn JobQueue>,
}

impl QueueObserver {
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl ErrorObserver for QueueObserver {
    fn name(&self) -> &str {
        "queue"
    }

    async fn on_error(&self, report: &ErrorReport) -> anyhow::Result<()> {
        let mut report = report.clone();
        if report.doctype.is_none() {
            report.doctype = extract_doctype(&report.raw_message);
        }
        self.queue.enqueue(ExplainJob::new(report)).await
    }
}

/// Ordered set of observers. The logging observer is installed at
/// construction and cannot be removed.
pub struct ObserverRegistry {
    observers: Mutex<Vec<Arc<dyn ErrorObserver>>>,
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(vec![Arc::new(LoggingObserver)]),
        }
    }

    pub fn register(&self, observer: Arc<dyn ErrorObserver>) {
        self.observers.lock().push(observer);
    }

    pub fn unregister(&self, name: &str) -> bool {
        if name == LOGGING_OBSERVER_NAME {
            return false;
        }
        let mut guard = self.observers.lock();
        let before = guard.len();
        guard.retain(|observer| observer.name() != name);
        guard.len() != before
    }

    pub async fn notify(&self, report: &ErrorReport) {
        let observers: Vec<Arc<dyn ErrorObserver>> = self.observers.lock().clone();
        for observer in observers {
            if let Err(err) = observer.on_error(report).await {
                warn!(
                    target: "errlens::observe",
                    observer = observer.name(),
                    error = %err,
                    "observer failed"
                );
            }
        }
    }
}
