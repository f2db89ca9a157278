//! I/O helpers kept outside the actor core.

pub mod config;
