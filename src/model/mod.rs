pub mod board;
pub mod config;
pub mod contact;
pub mod session;
pub mod task;

pub use board::*;
pub use config::*;
pub use contact::*;
pub use session::*;
pub use task::*;
