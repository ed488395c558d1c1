//! # Questgen
//!
//! Generates quests as graphs of typed facts. A quest template asks a
//! `quest_world` selector for the people and places it needs, then emits
//! states, edges, conditions and actions that refer to each other by uid.
//!
//! ## Core Components
//!
//! - **knowledge_base**: Fact variants, facts, the variant registry and the store
//! - **quest_graph**: Read-only view over one quest's facts, with structural checks
//! - **quests**: Quest templates
//!
//! ## Design Philosophy
//!
//! - **Schema-Driven**: Every fact variant declares its attributes, defaults and uid rule
//! - **Immutable**: Facts never change in place; `change` produces a new fact
//! - **Extensible**: New variants can be registered without modifying core logic

pub mod knowledge_base;
pub mod quest_graph;
pub mod quests;

pub use knowledge_base::*;
pub use quest_graph::*;
pub use quests::*;
