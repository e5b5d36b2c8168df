//! Tile-world generation library
//!
//! A world is a column-major grid of tiles shaped by a fixed sequence of
//! generation passes. `scheduler::generate` runs the whole pipeline.

pub mod biomes;
pub mod bins;
pub mod cleanup;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod framing;
pub mod ids;
pub mod parallel;
pub mod point;
pub mod random;
pub mod scheduler;
pub mod stamps;
pub mod structures;
pub mod tile;
pub mod tile_buffer;
pub mod world;
pub mod zone;
