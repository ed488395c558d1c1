//! # Quest World
//!
//! The world side of quest generation: the entities quests can refer to, the
//! TOML roster they are declared in, and the selector that picks them for
//! quest templates. This crate knows nothing about facts or quest graphs.

pub mod entities;
pub mod roster;
pub mod selector;

pub use entities::*;
pub use roster::*;
pub use selector::*;
