mod clock;
mod collision;
mod control;
mod ground;
mod lander;
mod mission;
mod physics;

pub use clock::*;
pub use collision::*;
pub use control::*;
pub use ground::*;
pub use lander::*;
pub use mission::*;
pub use physics::*;
