//! Core types: users, contacts, auth parameters, collaborator traits

pub mod collab;
pub mod tracing;
pub mod user;

pub use collab::{Router, Session};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use user::{AuthParams, Contact, User};
