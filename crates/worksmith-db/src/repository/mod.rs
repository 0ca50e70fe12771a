//! SurrealDB repository implementations.

mod quote;
mod session;
mod tenant;
mod user;
mod work_order;

pub use quote::SurrealQuoteRepository;
pub use session::SurrealSessionRepository;
pub use tenant::SurrealTenantRepository;
pub use user::SurrealUserRepository;
pub use work_order::SurrealWorkOrderRepository;
