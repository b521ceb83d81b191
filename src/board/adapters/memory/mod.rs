//! In-memory adapter implementing every board repository port.

mod store;

pub use store::InMemoryKaiStore;
