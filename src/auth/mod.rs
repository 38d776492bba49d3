//! Authentication and authorization primitives.
//!
//! Credentials are mocked at the account seam (two demo accounts plus
//! in-process registration) but still stored and verified as argon2id
//! hashes; capability checks gate every workflow entry point.

pub mod password;
pub mod permissions;

pub use password::{hash_password, verify_password};
pub use permissions::{ensure, is_allowed, required_role, Operation};
