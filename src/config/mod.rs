// TOML configuration: types, discovery and hot reload
mod load;
mod types;
pub mod watcher;

pub use self::load::{TOKEN_ENV, find_config_file, load_config, load_config_from_path};
pub use self::types::*;
