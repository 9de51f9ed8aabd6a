pub mod config;
pub mod error;

pub use config::{model_name, term_file_in, DeviceChoice, Language, RunConfig, RunLayout};
pub use error::{Result, SubstituteError};
