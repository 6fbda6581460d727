use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extract::{classify_error, extract_doctype, ErrorKind, ExtractedContext};

pub const HEADING_WHAT: &str = "What Went Wrong:";
pub const HEADING_FIX: &str = "How to Fix It:";

const UNKNOWN_DOCTYPE: &str = "Unknown DocType";
const MAX_WHAT_SENTENCES: usize = 3;
const MAX_PROSE_STEPS: usize = 7;
const MIN_WHAT_WORDS: usize = 4;
const MIN_FIX_CHARS: usize = 8;

static UNWANTED_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:💡|prevention tips\b|tips\b|best practices\b)").unwrap()
});
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static CRLF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n?").unwrap());
static WHAT_VARIANT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)what went wrong[:]*").unwrap());
static FIX_VARIANT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)how to fix it[:]*").unwrap());
static LEADING_EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[\x{2600}-\x{26FF}\x{2700}-\x{27BF}\x{F000}-\x{FAFF}\x{FE00}-\x{FE0F}\x{1F300}-\x{1FAFF}]+\s*",
    )
    .unwrap()
});
static NUMBERED_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\d+\.\s+").unwrap());
static NUMBERED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)\.\s*(.*)").unwrap());
static PROSE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+|\.\s+|;\s+|\n-\s+").unwrap());
static STRAY_IT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[Ii]t[:.\s]*$").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// The final artifact: exactly two named sections, the second always a
/// sequentially numbered step list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub what_went_wrong: String,
    pub how_to_fix: String,
}

impl Explanation {
    pub fn render(&self) -> String {
        format!(
            "{HEADING_WHAT}\n{}\n\n{HEADING_FIX}\n{}",
            self.what_went_wrong, self.how_to_fix
        )
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Turns arbitrary model output (or an empty string, when the provider
/// failed) into a well-formed two-section explanation. Total: every input
/// yields both sections, with rule-based fallbacks synthesized from the
/// original error when the raw text carries too little signal.
pub fn normalize(raw_text: &str, original_error: &str, doctype: Option<&str>) -> Explanation {
    let txt = strip_unwanted_sections(raw_text);
    let txt = strip_markup(&txt);
    let txt = WHAT_VARIANT.replace_all(&txt, HEADING_WHAT);
    let txt = FIX_VARIANT.replace_all(&txt, HEADING_FIX);

    let what = section_body(&txt, HEADING_WHAT, &[HEADING_FIX, HEADING_WHAT]);
    let fix = section_body(&txt, HEADING_FIX, &[HEADING_WHAT, HEADING_FIX]);
    let what = strip_leading_symbol(&what);
    let fix = strip_leading_symbol(&fix);

    let ctx = ExtractedContext::from_text(original_error);
    let resolved_doctype = doctype
        .map(str::to_string)
        .or_else(|| extract_doctype(original_error))
        .unwrap_or_else(|| UNKNOWN_DOCTYPE.to_string());

    let mut what = if what.split_whitespace().count() < MIN_WHAT_WORDS {
        fallback_what(original_error, &ctx, &resolved_doctype)
    } else {
        what
    };
    what = first_sentences(&what, MAX_WHAT_SENTENCES);
    if resolved_doctype != UNKNOWN_DOCTYPE
        && !what
            .to_lowercase()
            .contains(&resolved_doctype.to_lowercase())
    {
        what = format!("{what} (DocType: {resolved_doctype})");
    }

    let parsed_fix = parse_numbered_steps(&fix);
    let fix = if parsed_fix.trim().len() < MIN_FIX_CHARS {
        let fix_doctype = doctype
            .map(str::to_string)
            .or_else(|| extract_doctype(original_error))
            .unwrap_or_else(|| "the DocType".to_string());
        fallback_fix(original_error, &ctx, &fix_doctype)
    } else {
        parsed_fix
    };

    // Reassemble, then sweep once more in case a fallback body reintroduced
    // an unwanted heading shape.
    let rendered = Explanation {
        what_went_wrong: what,
        how_to_fix: fix,
    }
    .render();
    let swept = strip_unwanted_sections(&rendered);
    let swept = swept.trim();

    Explanation {
        what_went_wrong: section_body(swept, HEADING_WHAT, &[HEADING_FIX]),
        how_to_fix: section_body(swept, HEADING_FIX, &[]),
    }
}

/// Deletes every unwanted third-section heading ("Prevention Tips", "Tips",
/// "Best Practices", or a lightbulb-marked line) together with its body, up
/// to the next blank-line boundary or the end of the text.
fn strip_unwanted_sections(text: &str) -> String {
    let mut out = text.to_string();
    while let Some(m) = UNWANTED_HEADING.find(&out) {
        let start = m.start();
        let end = out[start..]
            .find("\n\n")
            .map(|offset| start + offset)
            .unwrap_or(out.len());
        out.replace_range(start..end, "");
    }
    out
}

fn strip_markup(text: &str) -> String {
    let s = BOLD.replace_all(text, "$1");
    let s = INLINE_CODE.replace_all(&s, "$1");
    let s = CRLF.replace_all(&s, "\n");
    s.trim().to_string()
}

// A body runs from its heading to the next occurrence of any canonical
// heading, so a reversed or repeated heading never leaks into a section.
fn section_body(text: &str, heading: &str, stops: &[&str]) -> String {
    let Some(idx) = text.find(heading) else {
        return String::new();
    };
    let start = idx + heading.len();
    let end = stops
        .iter()
        .filter_map(|stop| text[start..].find(stop))
        .min()
        .map(|offset| start + offset)
        .unwrap_or(text.len());
    text[start..end].trim().to_string()
}

fn strip_leading_symbol(text: &str) -> String {
    LEADING_EMOJI.replace(text, "").trim().to_string()
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if matches!(ch, '.' | '?' | '!') {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    let sentence = text[start..idx + 1].trim();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                    start = idx + 1;
                }
            }
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

fn first_sentences(text: &str, limit: usize) -> String {
    split_sentences(text)
        .into_iter()
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a "How to Fix It" body into a renumbered step list. Already
/// numbered text keeps its step boundaries (continuation lines merge into
/// the preceding step); prose is split into at most seven fragments.
/// Returns the rendered list, or an empty string when nothing usable is
/// present.
fn parse_numbered_steps(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    if NUMBERED_MARKER.is_match(text) {
        let mut steps: Vec<String> = Vec::new();
        let mut current: Option<String> = None;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(caps) = NUMBERED_LINE.captures(line) {
                if let Some(done) = current.take() {
                    steps.push(done);
                }
                current = Some(caps.get(2).map(|m| m.as_str()).unwrap_or("").trim().to_string());
            } else if let Some(step) = current.as_mut() {
                step.push(' ');
                step.push_str(line);
            } else {
                current = Some(line.to_string());
            }
        }
        if let Some(done) = current {
            steps.push(done);
        }
        return render_steps(steps);
    }

    let mut fragments: Vec<String> = PROSE_SPLIT
        .split(text)
        .map(|fragment| WHITESPACE.replace_all(fragment.trim(), " ").into_owned())
        .filter(|fragment| !fragment.is_empty())
        .collect();
    if fragments
        .first()
        .map(|first| STRAY_IT.is_match(first))
        .unwrap_or(false)
    {
        fragments.remove(0);
    }
    fragments.truncate(MAX_PROSE_STEPS);
    render_steps(fragments)
}

fn render_steps(steps: Vec<String>) -> String {
    steps
        .into_iter()
        .map(|step| step.trim().to_string())
        .filter(|step| !step.is_empty())
        .map(|step| {
            if step.ends_with('.') {
                step
            } else {
                format!("{step}.")
            }
        })
        .enumerate()
        .map(|(i, step)| format!("{}. {step}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn fallback_what(original_error: &str, ctx: &ExtractedContext, doctype: &str) -> String {
    if classify_error(original_error) == ErrorKind::NameError {
        let mut variable = ctx.variable_name.clone().unwrap_or_default();
        if variable == "frape" {
            variable.push_str(" (likely typo for 'frappe')");
        }
        let mut what = format!(
            "A NameError occurred in the {doctype} DocType, likely due to an undefined variable or typo: {variable}."
        );
        if let Some(script) = &ctx.script {
            what.push_str(&format!(
                " The error originated from the script/module '{script}'."
            ));
        }
        return what;
    }

    if let Some(field) = &ctx.field {
        return format!(
            "The {doctype} DocType raised an error referencing the field '{field}'; the attribute/field does not appear to exist or is not accessible."
        );
    }
    if let Some(script) = &ctx.script {
        return format!(
            "The {doctype} DocType raised an error originating from the script/module '{script}'; an attribute or field reference failed at runtime."
        );
    }
    format!("The {doctype} DocType caused an attribute/field reference error that failed at runtime.")
}

fn fallback_fix(original_error: &str, ctx: &ExtractedContext, doctype: &str) -> String {
    if classify_error(original_error) == ErrorKind::NameError {
        let variable = ctx.variable_name.clone().unwrap_or_default();
        let mut typo_step = format!(
            "Check if '{variable}' is a typo. Ensure it is defined or imported before use."
        );
        let lowered = variable.to_lowercase();
        if lowered.contains("frape") || lowered.contains("frapp") {
            typo_step.push_str(" (Did you mean 'frappe'?)");
        }

        let steps = vec![
            "Locate the error: Check Setup > Logs > Error Log for the full traceback.".to_string(),
            format!(
                "Open Setup > Customization > Server Scripts, filter by DocType = '{doctype}' and Event = 'Before Save' (or the event that matches your case), and look for scripts that might contain 'frappe' related code."
            ),
            format!("Search for the undefined name '{variable}' in the script code."),
            typo_step,
            "Save the Server Script and clear cache via Setup > System Settings > Clear Cache."
                .to_string(),
            "Test by reproducing the action that raised the error.".to_string(),
            "If persistent, check custom apps or hooks affecting this DocType.".to_string(),
        ];
        return render_steps(steps);
    }

    let mut steps = vec![
        "Locate where the error originates: check Setup > Logs > Error Log for the full traceback and note file/module lines."
            .to_string(),
    ];
    if let Some(script) = &ctx.script {
        steps.push(format!(
            "Open Setup > Customization > Server Scripts and search for the script named '{script}'."
        ));
    } else {
        steps.push(format!(
            "Open Setup > Customization > Server Scripts and search scripts that target {doctype} or review custom apps that touch {doctype}."
        ));
    }
    if let Some(field) = &ctx.field {
        steps.push(format!(
            "Search your codebase and DocType for the field or attribute '{field}' (use grep / ripgrep or the Desk global search)."
        ));
        steps.push(format!(
            "If '{field}' is a custom field, confirm it exists in the DocType (Customize Form > {doctype}). If it does not exist, either add the field or update the code to use the correct fieldname."
        ));
    } else {
        steps.push(
            "Search for likely misspelled attributes or calls in the script (names similar to the one in the traceback)."
                .to_string(),
        );
    }
    steps.push(
        "If code references an attribute on an object, guard the access (for example doc.get('fieldname') instead of a bare attribute) or correct the attribute name to the actual fieldname."
            .to_string(),
    );
    steps.push(
        "Save your changes, restart the worker if you modified Python modules, or save the Server Script and clear the cache via Setup > System Settings > Clear Cache."
            .to_string(),
    );
    steps.push(
        "Reproduce the original action that caused the error; confirm the error no longer appears and check Setup > Logs > Error Log for residual traces."
            .to_string(),
    );
    render_steps(steps)
}
