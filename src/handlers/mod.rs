/// Web API Handlers
///
/// This module contains the handlers for the document store endpoints.
/// Each handler extracts the request data, calls the matching repository
/// function and returns a JSON response or an `ApiError`.

mod account_handlers;
mod document_handlers;

// Re-export all handlers
pub use account_handlers::*;
pub use document_handlers::*;
