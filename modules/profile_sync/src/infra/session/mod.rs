mod file_store;
mod memory;

pub use file_store::{FileSessionStore, CURRENT_USER_KEY};
pub use memory::MemorySessionStore;
