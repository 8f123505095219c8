//! Configuration file loading for stagecraft
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `STAGECRAFT_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./stagecraft.toml` or `./.stagecraft.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/stagecraft/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileExpansionConfig, FileGeneratorConfig,
    FileInteractionConfig, FileOutputConfig, FileRefinementConfig, FileSceneConfig,
};
pub use loader::ConfigLoader;
