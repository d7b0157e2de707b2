mod catalog;
mod history;
mod writer;

pub use catalog::*;
pub use history::*;
pub use writer::*;
