pub mod extract;
pub mod fingerprint;
pub mod normalize;
pub mod prelude;
pub mod prompt;
pub mod redact;
pub mod report;

pub use extract::{
    classify_error, extract_doctype, extract_field, extract_script, undefined_name, ErrorKind,
    ExtractedContext,
};
pub use fingerprint::fingerprint;
pub use normalize::{normalize, Explanation};
pub use prompt::{build_prompt, SYSTEM_PROMPT};
pub use redact::redact;
pub use report::ErrorReport;
