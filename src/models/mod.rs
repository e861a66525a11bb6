//! Core data models for the document-locker service.
//!
//! These entities describe documents as the API presents them: the mutable
//! metadata sidecar attached to each stored object and the rows returned by
//! the filtered listing. They serialize naturally as JSON via `serde`.

pub mod document;
