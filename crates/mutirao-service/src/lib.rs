//! Mutirão Service — the role-request workflow, volunteer registration
//! with initial-role allocation, self-healing change watchers and the
//! action catalog.

pub mod catalog;
pub mod config;
pub mod error;
pub mod healing;
pub mod service;

pub use catalog::RoleCatalog;
pub use config::WorkflowConfig;
pub use error::WorkflowError;
pub use healing::{watch_roles, watch_volunteers};
pub use service::VolunteerService;
