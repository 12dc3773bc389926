pub mod agent;
pub mod chromosome;
pub mod config;
pub mod engine;
pub mod evolution;
pub mod fitness;
pub mod level;
pub mod physics;
pub mod render;
pub mod snapshot;
