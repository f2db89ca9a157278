//! Deterministic schema and validation logic shared by every actor.
//!
//! Core modules never perform I/O. They operate on a [`State`](crate::state::State)
//! and a declared field set and report violations by appending messages.

pub mod kind;
pub mod resolvable;
pub mod schema;
pub mod stages;
