//! Idle city builder: place buildings on a grid, collect production on a
//! timer, upgrade buildings and unlock achievements.
//!
//! The simulation core (`catalog`, `model`, `production`, `achievements`,
//! `engine`, `persistence`) has no browser dependency at runtime apart from
//! the `localStorage` store; `components` is the Yew front end.

pub mod achievements;
pub mod catalog;
pub mod components;
pub mod config;
pub mod engine;
pub mod model;
pub mod persistence;
pub mod production;
pub mod util;

pub use catalog::Catalog;
pub use config::GameConfig;
pub use engine::Session;
pub use model::{GameAction, GameState, Rejection};
