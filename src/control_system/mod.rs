pub mod signal_allocator;

pub use signal_allocator::{allocate, ranking};
