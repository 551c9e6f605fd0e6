//! Authentication core: credential hashing, token issuance and the
//! authorization gate.

pub mod password;
pub mod policy;
pub mod principal;
pub mod token;
