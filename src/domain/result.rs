//! Result type alias for Slotwise

use super::errors::SlotwiseError;

/// Result type alias for Slotwise operations
///
/// # Examples
///
/// ```
/// use slotwise::domain::result::Result;
/// use slotwise::domain::errors::SlotwiseError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SlotwiseError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SlotwiseError>;
