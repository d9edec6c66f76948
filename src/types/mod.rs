pub mod channel;
pub mod columns;
pub mod dataset;

pub use channel::*;
pub use columns::*;
pub use dataset::*;
