pub mod document_handlers;
pub mod health_handlers;
pub mod legacy_handlers;
pub mod session_handlers;
