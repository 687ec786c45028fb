//! Authentication building blocks: JWT handling, password hashing, and
//! share-token generation.

pub mod jwt;
pub mod password;
pub mod token;
