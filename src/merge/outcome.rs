//! Per-source outcomes and the run summary.

use std::fmt;

use crate::error::Error;

/// How processing one source ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Entries were merged into the document.
    Success { entries: usize },
    /// The input file does not exist.
    SkippedMissingFile,
    /// The source could not be turned into entries (unparseable, no cloud
    /// entries, no auth_url, or a project that could not be looked up).
    SkippedInvalidSource { message: String },
    /// The project listing failed or returned nothing.
    SkippedProjectListFailure { message: String },
}

impl SourceOutcome {
    /// Classify an error raised while processing a source.
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::SourceNotFound { .. } => SourceOutcome::SkippedMissingFile,
            Error::ProjectList { message, .. } => SourceOutcome::SkippedProjectListFailure {
                message: message.clone(),
            },
            Error::ExternalCommand { .. } => SourceOutcome::SkippedProjectListFailure {
                message: error.to_string(),
            },
            other => SourceOutcome::SkippedInvalidSource {
                message: other.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SourceOutcome::Success { .. })
    }
}

impl fmt::Display for SourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOutcome::Success { entries } => write!(f, "{} entries", entries),
            SourceOutcome::SkippedMissingFile => write!(f, "file not found"),
            SourceOutcome::SkippedInvalidSource { message } => {
                write!(f, "invalid source: {}", message)
            }
            SourceOutcome::SkippedProjectListFailure { message } => {
                write!(f, "project listing failed: {}", message)
            }
        }
    }
}

/// Outcome of every source, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    outcomes: Vec<(String, SourceOutcome)>,
}

impl RunSummary {
    /// Append an outcome and return a reference to it.
    pub fn push(&mut self, source: &str, outcome: SourceOutcome) -> &SourceOutcome {
        self.outcomes.push((source.to_string(), outcome));
        &self.outcomes[self.outcomes.len() - 1].1
    }

    pub fn outcomes(&self) -> &[(String, SourceOutcome)] {
        &self.outcomes
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Sources that were skipped, with their outcome.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &SourceOutcome)> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_success())
            .map(|(s, o)| (s.as_str(), o))
    }
}
