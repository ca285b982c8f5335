//! Command implementations.

pub mod config;
pub mod health;
pub mod parse;
pub mod presets;
pub mod validate_key;

pub use self::config::execute_config;
pub use self::health::execute_health;
pub use self::parse::execute_parse;
pub use self::presets::execute_presets;
pub use self::validate_key::execute_validate_key;
