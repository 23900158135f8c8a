pub mod fake;
pub mod jwt;

pub use fake::FakeTokenProvider;
pub use jwt::JwtTokenProvider;
