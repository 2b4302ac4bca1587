//! Service Layer
//!
//! Business logic that sequences the record store, cache and validator.
//! Route handlers stay thin and delegate here.

mod record_service;

pub use record_service::*;
