//! Local cache: typed access and the keys the application uses.

pub mod keys;
mod local;

pub use local::LocalCache;
