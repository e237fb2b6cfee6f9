use std::fmt;

use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A detected irregularity in the input or in a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered list of anomalies. Recording an anomaly logs it at the level matching its
/// severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Anomalies(Vec<Anomaly>);

impl Anomalies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.0.push(Anomaly {
            severity: Severity::Warning,
            message,
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{message}");
        self.0.push(Anomaly {
            severity: Severity::Error,
            message,
        });
    }

    /// Appends already-recorded anomalies without logging them again.
    pub fn extend(&mut self, other: Anomalies) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Anomaly> {
        self.0.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.0
            .iter()
            .any(|anomaly| anomaly.severity == Severity::Error)
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|anomaly| anomaly.message.clone()).collect()
    }
}

impl IntoIterator for Anomalies {
    type Item = Anomaly;
    type IntoIter = std::vec::IntoIter<Anomaly>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Anomalies {
    type Item = &'a Anomaly;
    type IntoIter = std::slice::Iter<'a, Anomaly>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Value produced by a pipeline step together with the anomalies it detected.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub anomalies: Anomalies,
}

impl<T> Outcome<T> {
    pub fn new(value: T, anomalies: Anomalies) -> Self {
        Self { value, anomalies }
    }

    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}
