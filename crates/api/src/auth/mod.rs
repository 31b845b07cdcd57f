//! Authentication primitives.
//!
//! Sessions are issued by an external identity provider; this server only
//! verifies the HS256 bearer tokens it hands out.

pub mod jwt;
