// Game layer: the demo scenes built on the engine

pub mod scenes;
