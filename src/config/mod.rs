// Configuration management module
// TOML settings, interactive setup and the logging configuration

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    ChatConfig, Config, ConfigError, DocumentsConfig, LoggingConfig, MemoryConfig, OllamaConfig,
    RetrievalConfig, RoutingConfig, WebSearchConfig,
};

/// Get the default configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
