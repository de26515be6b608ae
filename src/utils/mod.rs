// Shared utilities module
pub mod config_loader;
pub mod errors;
pub mod javascript;
pub mod logging;
pub mod ui;

pub use config_loader::*;
pub use errors::*;
pub use javascript::*;
pub use logging::*;
pub use ui::*;
