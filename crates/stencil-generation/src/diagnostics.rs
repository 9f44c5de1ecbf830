//! Diagnostic sink for template anomalies
//!
//! Every recoverable problem found while loading or generating a template is
//! reported through a [`Logger`] together with the current [`Locater`]
//! position. Reporting never fails and never changes control flow.

use std::{cell::RefCell, fmt, rc::Rc};

use tracing::{error, info, warn};

use crate::templates::Locater;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Informational; nothing was changed
    Info,
    /// A fallback value was substituted
    Warning,
    /// Input was rejected or discarded
    Error,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Info => write!(f, "info"),
            MessageKind::Warning => write!(f, "warning"),
            MessageKind::Error => write!(f, "error"),
        }
    }
}

/// A single reported diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity
    pub kind: MessageKind,
    /// Template position at the time of the report
    pub location: Option<Locater>,
    /// Human-readable message
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "[{}] {}: {}", self.kind, location, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Receives diagnostics from the template components
pub trait Logger {
    /// Report a diagnostic
    fn log(&self, kind: MessageKind, location: Option<&Locater>, message: &str);

    /// Report an informational message at a location
    fn info(&self, location: &Locater, message: &str) {
        self.log(MessageKind::Info, Some(location), message);
    }

    /// Report a warning at a location
    fn warning(&self, location: &Locater, message: &str) {
        self.log(MessageKind::Warning, Some(location), message);
    }

    /// Report an error at a location
    fn error(&self, location: &Locater, message: &str) {
        self.log(MessageKind::Error, Some(location), message);
    }
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, kind: MessageKind, location: Option<&Locater>, message: &str) {
        match (kind, location) {
            (MessageKind::Info, Some(at)) => {
                info!(segment = %at.segment(), line = at.line_number(), "{}", message)
            }
            (MessageKind::Warning, Some(at)) => {
                warn!(segment = %at.segment(), line = at.line_number(), "{}", message)
            }
            (MessageKind::Error, Some(at)) => {
                error!(segment = %at.segment(), line = at.line_number(), "{}", message)
            }
            (MessageKind::Info, None) => info!("{}", message),
            (MessageKind::Warning, None) => warn!("{}", message),
            (MessageKind::Error, None) => error!("{}", message),
        }
    }
}

/// Keeps diagnostics in memory.
///
/// Clones share the same buffer, so one handle can be given to the engine and
/// another kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    entries: Rc<RefCell<Vec<Diagnostic>>>,
}

impl MemoryLogger {
    /// Create an empty logger
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded diagnostics
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Whether any recorded message contains `fragment`
    pub fn contains(&self, fragment: &str) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|entry| entry.message.contains(fragment))
    }

    /// Number of diagnostics of the given kind
    pub fn count(&self, kind: MessageKind) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    /// Number of diagnostics recorded
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Forget all recorded diagnostics
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Logger for MemoryLogger {
    fn log(&self, kind: MessageKind, location: Option<&Locater>, message: &str) {
        self.entries.borrow_mut().push(Diagnostic {
            kind,
            location: location.cloned(),
            message: message.to_string(),
        });
    }
}
