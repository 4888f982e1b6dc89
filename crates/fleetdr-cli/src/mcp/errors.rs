//! Error handling utilities for the MCP server

use fleetdr_core::DrError;
use rmcp::ErrorData;

/// Converts a DR error into an MCP error.
///
/// Validation failures (unknown ids, bad cron, invalid input) are reported
/// as invalid parameters; everything else is an internal error.
pub fn to_mcp_error(message: &str, error: &DrError) -> ErrorData {
    let text = format!("{message}: {error}");
    if error.is_validation() {
        ErrorData::invalid_params(text, None)
    } else {
        ErrorData::internal_error(text, None)
    }
}
