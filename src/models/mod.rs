//! API data models
//!
//! Request/response schemas for the HTTP endpoints and the wire format of
//! the provider completion APIs.

pub mod chat;
pub mod completion;
pub mod essays;
pub mod scores;
pub mod tasks;
