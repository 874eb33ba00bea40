pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;

pub(crate) fn default_logging_level() -> String {
    "info".to_string()
}

pub(crate) fn default_tolerance_bp() -> u16 {
    10
}
