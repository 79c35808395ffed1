//! Lambda error types and formatting

use std::error::Error;
use std::fmt;

/// Error types reported for a failed invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    MalformedHandlerName,
    HandlerNotFound,
    InvalidInput,
    UnhandledError,
    Panic,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedHandlerName => "Runtime.MalformedHandlerName",
            Self::HandlerNotFound => "Runtime.HandlerNotFound",
            Self::InvalidInput => "Runtime.InvalidInput",
            Self::UnhandledError => "Runtime.UnhandledError",
            Self::Panic => "Runtime.Panic",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full description of a failure: type, message and cause chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub error_type: ErrorType,
    pub message: String,
    pub causes: Vec<String>,
}

impl ErrorReport {
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Build a report from a std error, walking its `source()` chain
    pub fn from_error(error_type: ErrorType, error: &(dyn Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            error_type,
            message: error.to_string(),
            causes,
        }
    }

    pub fn with_causes<I, S>(mut self, causes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.causes.extend(causes.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)?;
        for cause in &self.causes {
            write!(f, "\nCaused by: {cause}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("outer failure")
        }
    }

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("inner failure")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    impl Error for Inner {}

    #[test]
    fn test_report_format_without_causes() {
        let report = ErrorReport::new(ErrorType::HandlerNotFound, "no such module");
        assert_eq!(report.to_string(), "Runtime.HandlerNotFound: no such module");
    }

    #[test]
    fn test_report_walks_source_chain() {
        let report = ErrorReport::from_error(ErrorType::UnhandledError, &Outer(Inner));

        assert_eq!(report.message, "outer failure");
        assert_eq!(report.causes, vec!["inner failure".to_string()]);
        assert_eq!(
            report.to_string(),
            "Runtime.UnhandledError: outer failure\nCaused by: inner failure"
        );
    }

    #[test]
    fn test_with_causes_appends() {
        let report = ErrorReport::new(ErrorType::Panic, "boom").with_causes(["a", "b"]);
        assert_eq!(report.causes.len(), 2);
        assert!(report.to_string().ends_with("Caused by: a\nCaused by: b"));
    }
}
