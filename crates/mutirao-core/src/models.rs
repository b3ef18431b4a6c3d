//! Domain models for Mutirão.
//!
//! These are the core types shared across all crates. Cross-record
//! references (a volunteer's roles, a role's actions) are plain id
//! strings; resolving them into records is the caller's job.

pub mod action;
pub mod actor;
pub mod avatar;
pub mod change;
pub mod request;
pub mod role;
pub mod visitor;
pub mod volunteer;
