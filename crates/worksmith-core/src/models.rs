//! Domain models for Worksmith.
//!
//! These are the core types shared across all crates.

pub mod quote;
pub mod session;
pub mod tenant;
pub mod user;
pub mod work_order;
