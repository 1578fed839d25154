//! Core types and pure logic for the relief coordination service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! lifecycle rules, marker aggregation and session model live here; storage
//! backends and the HTTP layer depend on it.

pub mod dashboard;
pub mod error;
pub mod lifecycle;
pub mod marker;
pub mod report;
pub mod session;
pub mod store;
pub mod submission;

pub use error::{Error, Result};
