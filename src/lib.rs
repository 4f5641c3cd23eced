mod app;
mod error;
mod simulation;
pub mod init;

pub use app::*;
pub use error::*;
pub use simulation::*;
