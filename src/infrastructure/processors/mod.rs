// Processors module
pub mod formatter;
pub mod module_transformer;

pub use formatter::*;
pub use module_transformer::*;
