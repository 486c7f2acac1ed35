//! Remote function clients.

mod http;

pub use http::{HttpRemoteFunctions, RemoteConfig};
