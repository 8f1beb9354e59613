pub mod memory;
pub mod repositories;

pub use memory::*;
pub use repositories::*;
