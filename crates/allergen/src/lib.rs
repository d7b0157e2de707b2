mod error;
mod graph;
mod safety;

pub use error::*;
pub use graph::*;
pub use safety::*;
