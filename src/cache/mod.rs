//! Cache-aside storage port and key construction.

pub mod keys;
pub mod store;

pub use keys::KeyScope;
pub use store::{CachePort, InMemoryCache};
