//! Domain primitives for the streamshort auth core.
//!
//! Everything here is free of I/O so it can be shared by the storage layer,
//! the HTTP layer and tests alike.

pub mod clock;
pub mod content_status;
pub mod error;
pub mod hashing;
pub mod otp;
pub mod phone;
pub mod roles;
pub mod types;
pub mod validation;
