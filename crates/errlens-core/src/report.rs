use serde::{Deserialize, Serialize};

/// An error handed to the explainer. Ephemeral: built per request or per
/// intercepted exception, never persisted by the core itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorReport {
    pub raw_message: String,
    #[serde(default)]
    pub doctype: Option<String>,
    #[serde(default)]
    pub docname: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
}

impl ErrorReport {
    pub fn new(raw_message: impl Into<String>) -> Self {
        Self {
            raw_message: raw_message.into(),
            doctype: None,
            docname: None,
            route: None,
        }
    }

    pub fn with_doctype(mut self, doctype: impl Into<String>) -> Self {
        self.doctype = Some(doctype.into());
        self
    }

    pub fn with_docname(mut self, docname: impl Into<String>) -> Self {
        self.docname = Some(docname.into());
        self
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }
}
