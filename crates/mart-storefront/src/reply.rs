//! Handler results.

use mart_reports::Document;
use serde_json::Value;

/// What a handler asks the server to send back.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Render a named view with a JSON context.
    Render {
        view: &'static str,
        context: Value,
    },
    /// Redirect to a path.
    Redirect(String),
    /// Send a file as an attachment.
    Download(Document),
}

impl Reply {
    pub fn redirect(path: impl Into<String>) -> Self {
        Reply::Redirect(path.into())
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Reply::Redirect(path) => Some(path.as_str()),
            _ => None,
        }
    }

    pub fn view(&self) -> Option<&'static str> {
        match self {
            Reply::Render { view, .. } => Some(*view),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&Value> {
        match self {
            Reply::Render { context, .. } => Some(context),
            _ => None,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            Reply::Download(doc) => Some(doc),
            _ => None,
        }
    }
}
