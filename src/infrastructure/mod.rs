// Infrastructure layer
pub mod emitter;
pub mod file_system;
pub mod processors;

pub use emitter::*;
pub use file_system::*;
pub use processors::*;
