//! Small shared utilities.

mod generation;
mod slot_allocator;

pub use generation::{Cached, Generation};
pub use slot_allocator::SlotAllocator;
