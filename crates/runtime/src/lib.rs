pub mod config;
pub mod frame;
pub mod gesture;

pub use config::*;
pub use frame::*;
pub use gesture::*;
