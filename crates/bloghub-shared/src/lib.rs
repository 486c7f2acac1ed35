//! # BlogHub Shared
//!
//! Wire types exchanged with the hosted remote functions.
//! Kept free of domain logic so any client of the functions can use them.

pub mod dto;
pub mod response;

pub use response::FunctionResponse;
