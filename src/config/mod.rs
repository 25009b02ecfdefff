//! Layered configuration.
//!
//! Tiers, lowest priority first, merged field by field:
//! 1. **Defaults** compiled into [`Config::default`]
//! 2. **Project** `./todo-server/config.yaml`
//! 3. **User** `~/.todo-server/config.yaml`
//! 4. **Environment** variables
//!
//! An explicit file (`--config` or `TODO_SERVER_CONFIG_PATH`) replaces tiers 2 and 3.
//! CLI flags are applied by the binary after loading.
//!
//! ## Environment Variables
//! - `TODO_SERVER_CONFIG_PATH` - Explicit config file
//! - `TODO_SERVER_DB_PATH` - Database path
//! - `TODO_SERVER_HOST` - Bind address
//! - `TODO_SERVER_PORT` - Listen port
//! - `TODO_SERVER_USER_DIR` - User config dir (default: `~/.todo-server`)
//! - `TODO_SERVER_PROJECT_DIR` - Project config dir (default: `./todo-server`)

mod loader;
mod merge;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
