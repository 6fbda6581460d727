pub mod errors;
pub mod http;
pub mod observer;
pub mod orchestrator;
pub mod prelude;
pub mod queue;
pub mod settings;

pub use errors::ServiceError;
pub use http::{build_router, run, AppState};
pub use observer::{ErrorObserver, LoggingObserver, ObserverRegistry, QueueObserver};
pub use orchestrator::{test_error_message, ExplainOutcome, Explainer, HealthReport};
pub use queue::{ExplainJob, JobQueue, TokioJobQueue};
pub use settings::ExplainerSettings;
