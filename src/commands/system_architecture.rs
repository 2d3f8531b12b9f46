// src/commands/system_architecture.rs

//! The `system-architecture` command

use crate::commands::{CmdDesc, Command, SetupPolicy};
use crate::error::EXIT_OK;
use crate::session::Session;

static DESC: CmdDesc = CmdDesc {
    aliases: &["system-architecture"],
    synopsis: &["system-architecture"],
    summary: "Print the detected system architecture.",
    description: "Print the architecture satchel operates for. The value can be overridden \
with the 'arch' configuration setting.",
    setup: SetupPolicy::NoSetup,
};

pub struct SystemArchitectureCmd;

impl Command for SystemArchitectureCmd {
    fn desc(&self) -> &'static CmdDesc {
        &DESC
    }

    fn execute(&mut self, session: &mut Session, _args: &[String]) -> i32 {
        let arch = session.config.arch.clone();
        session.out.info(arch);
        EXIT_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::test_session;

    #[test]
    fn test_prints_configured_architecture() {
        let (mut session, _, captured) = test_session();
        session.config.arch = "aarch64".to_string();
        let code = SystemArchitectureCmd.execute(&mut session, &[]);
        assert_eq!(code, EXIT_OK);
        assert_eq!(captured.stdout.contents(), "aarch64\n");
    }
}
