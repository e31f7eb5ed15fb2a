//! Output side of a view: table contents and transient notices.

use riziq_types::Record;

use crate::merge::View;

/// A message shown to the operator without blocking them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice::Info(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::Error(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Info(message) | Notice::Error(message) => message,
        }
    }
}

pub trait RenderSink {
    /// Replaces the visible table with `view`.
    fn render(&mut self, view: &View);

    fn notify(&mut self, notice: Notice);

    /// Shows the full details of one record.
    fn detail(&mut self, _record: &Record) {}
}
