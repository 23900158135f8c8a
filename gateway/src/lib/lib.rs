pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::account;
pub use domain::auth::service::AuthService;
pub use outbound::repositories;
