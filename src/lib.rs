pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod models;
pub mod service;
pub mod store;

// Re-export commonly used types for easier access
pub use error::{AppError, AppResult};
pub use models::{Account, BackendGroup, MembershipType, NewBackendGroup};
pub use service::OrganisationService;
