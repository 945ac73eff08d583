//! # Domain Types
//!
//! Configuration and protocol constants shared by every OCCI crate.
//! Only `serde` is allowed here: no I/O, networking or protocol logic.

pub mod config;
pub mod constants;
