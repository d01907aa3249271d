//! Configuration module
//!
//! Loading and validation of coordinator policies: frame pacing, the
//! optional skip-on-timeout, the driver's frame budget, and the CLI host's
//! visibility.

pub mod loader;
pub mod schema;

pub use loader::{CONFIG_ENV, load_config, load_or_default, parse_config};
pub use schema::{CoordinatorConfig, DEFAULT_MAX_FRAMES, RawConfig, parse_duration};
