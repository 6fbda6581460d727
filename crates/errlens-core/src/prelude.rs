pub use crate::extract::{
    classify_error, extract_doctype, extract_field, extract_script, undefined_name, ErrorKind,
    ExtractedContext,
};
pub use crate::fingerprint::fingerprint;
pub use crate::normalize::{normalize, Explanation};
pub use crate::prompt::{build_prompt, SYSTEM_PROMPT};
pub use crate::redact::redact;
pub use crate::report::ErrorReport;
