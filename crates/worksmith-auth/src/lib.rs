//! Worksmith Auth — credential mechanics (EdDSA JWTs, Argon2id
//! passwords), principal resolution, and the per-request authorization
//! context builder with its cross-tenant context-switch protocol.

pub mod config;
pub mod context_builder;
pub mod error;
pub mod password;
pub mod resolver;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use context_builder::{ContextBuilder, OverrideKey, parse_override};
pub use error::AuthError;
pub use resolver::PrincipalResolver;
pub use service::{AuthService, LoginInput, LoginOutput, RefreshOutput};
pub use token::AccessTokenClaims;
