use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Coarse classification of the failure, recovered from the raw text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NameError,
    AttributeError,
    Other,
}

/// Best-effort context recovered from free-form error/traceback text.
/// May be entirely empty; never fails.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExtractedContext {
    pub doctype: Option<String>,
    pub field: Option<String>,
    pub script: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub variable_name: Option<String>,
}

impl ExtractedContext {
    pub fn from_text(text: &str) -> Self {
        Self {
            doctype: extract_doctype(text),
            field: extract_field(text),
            script: extract_script(text),
            error_kind: Some(classify_error(text)),
            variable_name: undefined_name(text),
        }
    }
}

// The pattern lists below are the extraction algorithm, not incidental
// parsing. Each list is a priority order: the first in-bounds match wins,
// and structural patterns sit above looser ones that can false-positive on
// arbitrary capitalized phrases. Tests pin the order.

static DOCTYPE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)in DocType ['"]([^'"]+)['"]"#,
        r#"(?i)DocType:\s*['"]?([A-Za-z0-9 _\-]+?)['"]?\s*(?:$|[\n,])"#,
        r#"(?i)frappe\.get_doc\(\s*['"]([^'"]+)['"]"#,
        r#"(?i)doctype[\s=]+['"]([^'"]+)['"]"#,
        r#"in ([A-Z][A-Za-z0-9_ ]{2,30}) [Dd]oc[Tt]ype"#,
        r#"([A-Z][A-Za-z0-9_ ]{3,40}) DocType"#,
        r#"for ([A-Z][a-zA-Z0-9 ]+)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static FIELD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)field '([^']+)'"#,
        r#"(?i)field "([^"]+)""#,
        r#"(?i)attribute '([^']+)'"#,
        r#"(?i)AttributeError: '([^']+)'"#,
        r#"(?i)KeyError: '([^']+)'"#,
        r#"(?i)'([A-Za-z0-9_]+)' field"#,
        r#"(?i)column "?([A-Za-z0-9_]+)"?"#,
        r#"(?i)Undefined field: ([A-Za-z0-9_]+)"#,
        r#"(?i)Value missing for: ([A-Za-z0-9_ \-]+)"#,
        r#"(?i)Invalid value for ([A-Za-z0-9_ \-]+)"#,
        r#"(?i)LinkValidationError: ([A-Za-z0-9_ \-]+)"#,
        r#"(?i)Duplicate name ([A-Za-z0-9_ \-]+)"#,
        r#"(?i)Property ([A-Za-z0-9_ \-]+) not found"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SCRIPT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)Server Script[:\s]+['"]?([^'"\n]+?)['"]?\s*(?:$|\n)"#,
        r#"(?i)File "[^"]*/([^/"]+)\.py""#,
        r#"(?i)module '([A-Za-z0-9_\-.]+)'"#,
        r#"(?i)script '([^']+)'"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static UNDEFINED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"name '([^']+)' is not defined").unwrap());

fn first_match(patterns: &[Regex], text: &str, min: usize, max: usize) -> Option<String> {
    for pattern in patterns {
        if let Some(caps) = pattern.captures(text) {
            let candidate = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            if candidate.len() >= min && candidate.len() <= max {
                return Some(candidate.to_string());
            }
        }
    }
    None
}

/// Recovers a DocType name from traceback-like text. 3..=100 chars.
pub fn extract_doctype(text: &str) -> Option<String> {
    first_match(&DOCTYPE_PATTERNS, text, 3, 100)
}

/// Recovers a failing field or attribute name. 2..=200 chars.
pub fn extract_field(text: &str) -> Option<String> {
    first_match(&FIELD_PATTERNS, text, 2, 200)
}

/// Recovers a script or module name. 2..=200 chars.
pub fn extract_script(text: &str) -> Option<String> {
    first_match(&SCRIPT_PATTERNS, text, 2, 200)
}

/// The variable a NameError complains about, if the text carries the
/// canonical `name '<x>' is not defined` phrasing.
pub fn undefined_name(text: &str) -> Option<String> {
    UNDEFINED_NAME
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn classify_error(text: &str) -> ErrorKind {
    if text.contains("NameError") {
        ErrorKind::NameError
    } else if text.contains("AttributeError") {
        ErrorKind::AttributeError
    } else {
        ErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_doctype_beats_loose_capitalized_phrase() {
        // Both patterns match; the quoted structural form must win.
        let text = "error for Payment Entry while in DocType 'Sales Order'";
        assert_eq!(extract_doctype(text).as_deref(), Some("Sales Order"));
    }

    #[test]
    fn doctype_from_get_doc_call() {
        let text = r#"  doc = frappe.get_doc("Delivery Note", "DN-0042")"#;
        assert_eq!(extract_doctype(text).as_deref(), Some("Delivery Note"));
    }

    #[test]
    fn loose_capitalized_phrase_as_last_resort() {
        let text = "validation failed for Purchase Invoice";
        assert_eq!(extract_doctype(text).as_deref(), Some("Purchase Invoice"));
    }

    #[test]
    fn doctype_out_of_bounds_is_rejected() {
        assert_eq!(extract_doctype("in DocType 'ab'"), None);
        let long = format!("in DocType '{}'", "x".repeat(120));
        assert_eq!(extract_doctype(&long), None);
    }

    #[test]
    fn field_from_mandatory_error() {
        let text = "MandatoryError: Value missing for: customer_name";
        assert_eq!(extract_field(text).as_deref(), Some("customer_name"));
    }

    #[test]
    fn value_for_phrase_does_not_yield_a_field() {
        // Only the explicit "Invalid value for <field>" form names the
        // field; a bare "value X for Y" phrase names the value and must
        // not be misreported as a fieldname.
        assert_eq!(
            extract_field("Invalid value for customer_name").as_deref(),
            Some("customer_name")
        );
        assert_eq!(extract_field("got value 'ABC-001' for an unknown key"), None);
    }

    #[test]
    fn field_from_quoted_attribute() {
        let text = "AttributeError: 'Sales Order' object has no attribute 'test_field'";
        // The quoted-attribute pattern outranks the AttributeError pattern.
        assert_eq!(extract_field(text).as_deref(), Some("test_field"));
    }

    #[test]
    fn script_from_python_file_frame() {
        let text = r#"  File "/home/frappe/bench/apps/custom/billing_hooks.py", line 4"#;
        assert_eq!(extract_script(text).as_deref(), Some("billing_hooks"));
    }

    #[test]
    fn script_from_server_script_mention() {
        let text = "failed in Server Script: 'Invoice Validation'\nmore";
        assert_eq!(extract_script(text).as_deref(), Some("Invoice Validation"));
    }

    #[test]
    fn undefined_name_is_recovered() {
        let text = "NameError: name 'frape' is not defined";
        assert_eq!(undefined_name(text).as_deref(), Some("frape"));
        assert_eq!(classify_error(text), ErrorKind::NameError);
    }

    #[test]
    fn classification_defaults_to_other() {
        assert_eq!(classify_error("TimeoutError: deadline"), ErrorKind::Other);
    }

    #[test]
    fn extraction_of_garbage_is_all_empty() {
        let ctx = ExtractedContext::from_text("%%%%");
        assert!(ctx.doctype.is_none());
        assert!(ctx.field.is_none());
        assert!(ctx.script.is_none());
        assert!(ctx.variable_name.is_none());
    }
}
