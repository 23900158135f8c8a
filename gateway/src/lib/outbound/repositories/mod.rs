pub mod account;
pub mod memory;

pub use account::PostgresAccountStore;
pub use memory::InMemoryAccountStore;
