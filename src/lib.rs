pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod loader;
pub mod parser;
pub mod query;
pub mod schema;
pub mod team;
pub mod ui;

pub use app::AppContext;
pub use cli::{Cli, Commands};
pub use error::{ConfigError, LoadError, TeamError};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui};
