// Physics system using rapier3d

pub mod body;
mod contact;
mod debug;
mod world;

pub use body::{BodyDesc, ShapeDesc};
pub use contact::{ContactProperties, ContactRule};
pub use debug::{DebugOverlay, DebugProxy};
pub use world::{BodyHandle, PhysicsWorld, GRAVITY};
