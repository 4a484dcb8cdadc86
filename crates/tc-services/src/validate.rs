//! Bridging `validator` derive output into the core error type

use tc_core::error::ValidationErrors;
use validator::Validate;

/// Run a DTO's derived validations, converting failures into the core
/// `ValidationErrors` shape.
pub(crate) fn run_validations<T: Validate>(value: &T) -> Result<(), ValidationErrors> {
    match value.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let mut converted = ValidationErrors::new();
            for (field, field_errors) in errors.field_errors() {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("is invalid ({})", error.code));
                    converted.add(field.to_string(), message);
                }
            }
            Err(converted)
        }
    }
}
