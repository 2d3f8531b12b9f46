// src/commands/repos/mod.rs

//! Repository management commands

mod add;

pub use add::AddRepoCmd;
