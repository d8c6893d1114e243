pub mod core;
pub mod emit;
pub mod fields;
pub mod loader;
