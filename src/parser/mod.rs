pub mod channels;
pub mod header;
pub mod main;
pub mod samples;

pub use channels::*;
pub use header::*;
pub use main::*;
pub use samples::*;
