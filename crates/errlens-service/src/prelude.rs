pub use crate::errors::ServiceError;
pub use crate::http::{build_router, run, AppState};
pub use crate::observer::{ErrorObserver, LoggingObserver, ObserverRegistry, QueueObserver};
pub use crate::orchestrator::{test_error_message, ExplainOutcome, Explainer, HealthReport};
pub use crate::queue::{ExplainJob, JobQueue, TokioJobQueue};
pub use crate::settings::ExplainerSettings;
