pub mod compiler;
pub mod dsl;
pub mod error;

pub use compiler::core::ToDocument;
pub use dsl::builder::Graph;
pub use dsl::{State, StateKind};
pub use error::GraphError;
