use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

use errlens_core::{fingerprint, redact, ErrorReport};

use crate::orchestrator::Explainer;

const JOB_NAME_HASH_CHARS: usize = 10;

/// One unit of background work. The job name is derived from the report
/// content so identical errors collapse to one in-flight job.
#[derive(Clone, Debug)]
pub struct ExplainJob {
    pub report: ErrorReport,
    pub job_name: String,
}

impl ExplainJob {
    pub fn new(report: ErrorReport) -> Self {
        let key = fingerprint(
            &redact(&report.raw_message),
            report.doctype.as_deref(),
            report.docname.as_deref(),
            "",
            "",
        );
        let digest = key.rsplit(':').next().unwrap_or("");
        let short: String = digest.chars().take(JOB_NAME_HASH_CHARS).collect();
        Self {
            report,
            job_name: format!("errlens_explain_{short}"),
        }
    }
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: ExplainJob) -> anyhow::Result<()>;
}

/// Runs explanation jobs on the tokio runtime. A job name stays reserved
/// until its task finishes, so a burst of identical errors produces at most
/// one concurrent explanation.
pub struct TokioJobQueue {
    explainer: Arc<Explainer>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl TokioJobQueue {
    pub fn new(explainer: Arc<Explainer>) -> Self {
        Self {
            explainer,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

#[async_trait]
impl JobQueue for TokioJobQueue {
    async fn enqueue(&self, job: ExplainJob) -> anyhow::Result<()> {
        if !self.in_flight.lock().insert(job.job_name.clone()) {
            debug!(target: "errlens::queue", job = %job.job_name, "duplicate job suppressed");
            return Ok(());
        }

        let explainer = self.explainer.clone();
        let in_flight = self.in_flight.clone();
        let name = job.job_name.clone();
        tokio::spawn(async move {
            let outcome = explainer.explain(&job.report, Some("system"), &[]).await;
            info!(
                target: "errlens::queue",
                job = %name,
                cached = outcome.cached,
                "background explanation ready"
            );
            in_flight.lock().remove(&name);
        });
        Ok(())
    }
}
