//! Result type aliases and the service result pattern

use crate::error::{TcError, ValidationErrors};

/// Standard Result type for TaskCenter operations
pub type TcResult<T> = Result<T, TcError>;

/// Service result pattern
///
/// Carries either the operation's value or the typed error that rejected it.
/// Unlike a bare `Result`, the failure side keeps the full error taxonomy
/// (validation vs. permission vs. state) so the caller can surface the exact
/// reason to the user.
#[derive(Debug)]
pub struct ServiceResult<T> {
    result: Option<T>,
    error: Option<TcError>,
}

impl<T> ServiceResult<T> {
    /// Create a successful result
    pub fn success(result: T) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    /// Create a failed result from any core error
    pub fn failure(error: TcError) -> Self {
        Self {
            result: None,
            error: Some(error),
        }
    }

    /// Create a failed result from accumulated validation errors
    pub fn validation_failure(errors: ValidationErrors) -> Self {
        Self::failure(TcError::Validation(errors))
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&TcError> {
        self.error.as_ref()
    }

    /// Validation errors of a failed result, if the failure was a validation one
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match &self.error {
            Some(TcError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }

    /// Map the result value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ServiceResult<U> {
        ServiceResult {
            result: self.result.map(f),
            error: self.error,
        }
    }

    /// Chain another service call
    pub fn and_then<U, F: FnOnce(T) -> ServiceResult<U>>(self, f: F) -> ServiceResult<U> {
        match self.result {
            Some(value) => f(value),
            None => ServiceResult {
                result: None,
                error: self.error,
            },
        }
    }

    /// Convert to standard Result, preserving the typed error
    pub fn into_result(self) -> TcResult<T> {
        match (self.result, self.error) {
            (Some(value), _) => Ok(value),
            (None, Some(error)) => Err(error),
            (None, None) => Err(TcError::Internal(
                "ServiceResult with neither value nor error".into(),
            )),
        }
    }
}

impl<T> From<TcResult<T>> for ServiceResult<T> {
    fn from(result: TcResult<T>) -> Self {
        match result {
            Ok(value) => ServiceResult::success(value),
            Err(e) => ServiceResult::failure(e),
        }
    }
}

impl<T> From<ServiceResult<T>> for TcResult<T> {
    fn from(result: ServiceResult<T>) -> Self {
        result.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_round_trip() {
        let result = ServiceResult::success(42);
        assert!(result.is_success());
        assert_eq!(result.into_result().ok(), Some(42));
    }

    #[test]
    fn test_failure_keeps_taxonomy() {
        let result: ServiceResult<()> = ServiceResult::failure(TcError::permission("nope"));
        assert!(result.is_failure());
        assert!(matches!(
            result.into_result(),
            Err(TcError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_validation_errors_accessor() {
        let errors = ValidationErrors::single("score", "exceeds cap");
        let result: ServiceResult<()> = ServiceResult::validation_failure(errors);
        assert!(result.validation_errors().unwrap().has_error("score"));
    }

    #[test]
    fn test_and_then_short_circuits() {
        let result: ServiceResult<i32> = ServiceResult::failure(TcError::state("blocked"));
        let chained = result.and_then(|v| ServiceResult::success(v + 1));
        assert!(matches!(chained.error(), Some(TcError::State { .. })));
    }
}
