pub mod m49;
pub mod resolver;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use m49::{ancestry, m49_entry, M49Entry};
pub use resolver::{CategoryStore, LocationStore, Resolution, Resolver};
