pub mod card;
pub mod column;
pub mod errors;

pub use card::*;
pub use column::*;
pub use errors::*;
