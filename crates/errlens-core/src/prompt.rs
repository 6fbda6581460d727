use crate::extract::extract_doctype;

/// System instruction sent with every completion request. The normalizer
/// still enforces the two-section shape afterwards; this just raises the
/// odds the model returns it directly.
pub const SYSTEM_PROMPT: &str = "You are an ERPNext expert assistant. Produce EXACTLY two sections using these exact headings:\n\n\
What Went Wrong:\n\
How to Fix It:\n\n\
IMPORTANT: DO NOT include any 'Prevention Tips', 'Tips', 'Best Practices', or ANY third section. \
Only provide the two required sections.\n\n\
Rules for 'What Went Wrong': identify the DocType and the likely failing field or attribute; explain the root cause in 1-3 short sentences.\n\
Rules for 'How to Fix It': return 5-7 sequential numbered steps (1., 2., 3., ...). Steps must be actionable and ERPNext-specific \
(include navigation, file / script names or DocType field names if possible). Return plain text only.";

/// Builds the user message. The error text must already be redacted by the
/// caller. When no doctype is supplied, one is recovered from the error
/// text itself so the model is not left guessing.
pub fn build_prompt(
    redacted_message: &str,
    doctype: Option<&str>,
    docname: Option<&str>,
    route: Option<&str>,
    user_roles: &[String],
) -> String {
    let doctype = doctype
        .map(str::to_string)
        .or_else(|| extract_doctype(redacted_message));
    let roles = if user_roles.is_empty() {
        "unknown".to_string()
    } else {
        user_roles.join(", ")
    };

    format!(
        "Analyze the ERPNext error below and produce EXACTLY TWO sections.\n\n\
ERROR:\n{redacted_message}\n\n\
CONTEXT:\n\
Doctype: {}\n\
Document: {}\n\
Route: {}\n\
User Roles: {roles}\n\n\
Produce EXACTLY TWO sections titled:\n\
What Went Wrong:\n\
How to Fix It:\n\n\
IMPORTANT: DO NOT include any 'Prevention Tips', 'Tips', 'Best Practices', or ANY third section. Only provide the two required sections.\n\n\
- 'What Went Wrong' must identify the DocType and state the likely failing field/attribute or script (1-3 short sentences).\n\
- If it's a NameError or typo, identify the missing variable and suggest corrections (e.g., 'frape' -> 'frappe').\n\
- 'How to Fix It' must provide 5-7 numbered, sequential, actionable steps (start each with 1., 2., 3., etc.). Include ERPNext navigation and mention file/script/DocType field names if available.\n\
- Return plain text only; no extra sections.",
        doctype.as_deref().unwrap_or("Not specified"),
        docname.unwrap_or("Not specified"),
        route.unwrap_or("Not specified"),
    )
}
