use sha2::{Digest, Sha256};

const KEY_PREFIX: &str = "errlens:exp:";

/// Cache key for one explanation request. Built from the redacted message
/// plus everything that changes the answer (context, provider, model), so a
/// provider or model switch never serves a stale entry.
pub fn fingerprint(
    redacted_message: &str,
    doctype: Option<&str>,
    docname: Option<&str>,
    provider: &str,
    model: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(redacted_message.as_bytes());
    hasher.update(doctype.unwrap_or("").as_bytes());
    hasher.update(docname.unwrap_or("").as_bytes());
    hasher.update(provider.as_bytes());
    hasher.update(model.as_bytes());
    format!("{KEY_PREFIX}{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_for_identical_input() {
        let a = fingerprint("msg", Some("Sales Order"), Some("SO-1"), "Groq", "llama");
        let b = fingerprint("msg", Some("Sales Order"), Some("SO-1"), "Groq", "llama");
        assert_eq!(a, b);
        assert!(a.starts_with(KEY_PREFIX));
    }

    #[test]
    fn every_component_is_significant() {
        let base = fingerprint("msg", Some("Sales Order"), Some("SO-1"), "Groq", "llama");
        assert_ne!(base, fingerprint("other", Some("Sales Order"), Some("SO-1"), "Groq", "llama"));
        assert_ne!(base, fingerprint("msg", None, Some("SO-1"), "Groq", "llama"));
        assert_ne!(base, fingerprint("msg", Some("Sales Order"), None, "Groq", "llama"));
        assert_ne!(base, fingerprint("msg", Some("Sales Order"), Some("SO-1"), "OpenAI", "llama"));
        assert_ne!(base, fingerprint("msg", Some("Sales Order"), Some("SO-1"), "Groq", "gpt-4o"));
    }
}
