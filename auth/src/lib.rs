//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure:
//! - Password hashing (PBKDF2-HMAC-SHA256, `<salt hex>:<key hex>` format)
//! - JWT token generation and validation
//!
//! Services define their own ports around these and keep their domain types
//! out of this crate.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.validate(&hash, "my_password"));
//! assert!(!hasher.validate("no-separator", "my_password"));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{Claims, JwtHandler};
//! use chrono::{Duration, Utc};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = Claims::for_subject(42, ["admin"], Utc::now() + Duration::hours(1));
//! let token = handler.encode(&claims).unwrap();
//! let decoded: Claims = handler.decode(&token).unwrap();
//! assert_eq!(decoded.sub.as_deref(), Some("42"));
//! ```

pub mod jwt;
pub mod password;

pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
