//! Result type alias for the order exporter
//!
//! This module provides a convenient Result type alias that uses
//! `OrderExportError` as the error type.

use super::errors::OrderExportError;

/// Result type alias for order-export operations
///
/// # Examples
///
/// ```
/// use order_export::domain::result::Result;
/// use order_export::domain::errors::OrderExportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(OrderExportError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, OrderExportError>;
