// Core utilities shared across the engine

pub mod math;

pub use math::Transform;
