// Core domain layer
pub mod generator;
pub mod graph;
pub mod interfaces;
pub mod models;
pub mod resolver;
pub mod services;

pub use generator::*;
pub use graph::*;
pub use interfaces::*;
pub use models::*;
pub use resolver::*;
pub use services::*;
