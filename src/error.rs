//! Error taxonomy for the table engine.
//!
//! Most conditions here are recoverable: the pipeline skips the offending
//! stage and hands the error to an [`ErrorSink`] instead of failing the
//! whole table. Only ingestion and export return them to the caller.

use std::cell::RefCell;
use std::fmt;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("column '{0}' is not declared in the table schema")]
    UnknownColumn(String),

    #[error("filter on '{field}' uses {operator} but '{value}' is not a number")]
    NonNumericThreshold {
        field: String,
        operator: String,
        value: String,
    },

    #[error("record {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("record id '{0}' appears more than once in the source")]
    DuplicateId(String),

    #[error("page size must be greater than zero")]
    InvalidPageSize,

    #[error("record source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("csv export failed: {0}")]
    Export(String),

    #[error("invalid table configuration: {0}")]
    Config(String),
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        TableError::Export(err.to_string())
    }
}

/// The pipeline stage a recoverable error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Filter,
    Sort,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Filter => f.write_str("filter"),
            PipelineStage::Sort => f.write_str("sort"),
        }
    }
}

/// Receives pipeline errors that were recovered from rather than thrown.
pub trait ErrorSink {
    fn report(&self, stage: PipelineStage, error: &TableError);
}

/// Default sink: writes recovered errors to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, stage: PipelineStage, error: &TableError) {
        log::warn!("{} stage skipped: {}", stage, error);
    }
}

/// Sink that keeps every report, for inspection in tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingSink {
    reports: RefCell<Vec<(PipelineStage, TableError)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<(PipelineStage, TableError)> {
        self.reports.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.borrow().is_empty()
    }
}

impl ErrorSink for RecordingSink {
    fn report(&self, stage: PipelineStage, error: &TableError) {
        self.reports.borrow_mut().push((stage, error.clone()));
    }
}

impl<T: ErrorSink + ?Sized> ErrorSink for std::rc::Rc<T> {
    fn report(&self, stage: PipelineStage, error: &TableError) {
        (**self).report(stage, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TableError::NonNumericThreshold {
            field: "amount".to_string(),
            operator: "greaterThan".to_string(),
            value: "lots".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "filter on 'amount' uses greaterThan but 'lots' is not a number"
        );
        assert_eq!(
            TableError::UnknownColumn("agent".to_string()).to_string(),
            "column 'agent' is not declared in the table schema"
        );
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());

        sink.report(PipelineStage::Sort, &TableError::UnknownColumn("x".to_string()));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.reports()[0].0, PipelineStage::Sort);
    }
}
