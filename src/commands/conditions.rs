// src/commands/conditions.rs

//! Preconditions gating command execution
//!
//! Conditions are stateless checks evaluated by the dispatcher, in order,
//! before a command's `execute` runs. The first failure stops evaluation,
//! its reason is reported, and the command never executes.

use crate::error::EXIT_ERR_PRIVILEGES;
use crate::session::Session;

/// Why a condition refused to let the command run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionFailure {
    pub reason: String,
    pub exit_code: i32,
}

/// A named precondition shared between commands.
pub trait Condition {
    fn check(&self, session: &Session) -> Result<(), ConditionFailure>;
}

/// The command modifies system state and must run as root.
pub struct NeedsRoot;

impl Condition for NeedsRoot {
    fn check(&self, session: &Session) -> Result<(), ConditionFailure> {
        if session.root_user {
            Ok(())
        } else {
            Err(ConditionFailure {
                reason: "Root privileges are required to run this command.".to_string(),
                exit_code: EXIT_ERR_PRIVILEGES,
            })
        }
    }
}
