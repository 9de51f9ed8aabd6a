// Pipeline modules organized by functionality
pub mod substitution;
pub mod utils;

pub use substitution::*;
