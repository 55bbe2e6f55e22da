pub mod config;
pub mod linker;
pub mod model;
pub mod resolve;
