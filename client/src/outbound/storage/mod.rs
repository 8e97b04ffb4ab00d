//! Session storage adapters.

mod file;
mod memory;

pub use file::{FileStorage, STORE_FILENAME};
pub use memory::MemoryStorage;
