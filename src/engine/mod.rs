// Engine modules: timing, physics, sync, assets, panel

pub mod assets;
pub mod clock;
pub mod error;
pub mod game_loop;
pub mod panel;
pub mod physics;
pub mod registry;
pub mod renderer;
pub mod simulation;
pub mod sync;
