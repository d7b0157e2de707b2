mod assembler;
mod error;
mod memory;
mod preference;
mod scorer;
mod service;
mod settings;

pub use assembler::*;
pub use error::*;
pub use memory::*;
pub use preference::*;
pub use scorer::*;
pub use service::*;
pub use settings::*;

cfg_if::cfg_if! {
    if #[cfg(feature = "full")] {
        mod sqlite;

        pub use sqlite::*;
    }
}
