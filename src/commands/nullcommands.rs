// src/commands/nullcommands.rs

//! Commands kept for compatibility or amusement

use crate::commands::{CmdDesc, Command, SetupPolicy, help_text, report_too_few_arguments};
use crate::error::{EXIT_ERR_INVALID_ARGS, EXIT_ERR_REPO, EXIT_OK};
use crate::repository::{MatchMode, SearchAttribute, SearchQuery};
use crate::session::Session;

static MOO_DESC: CmdDesc = CmdDesc {
    aliases: &["moo"],
    synopsis: &["moo"],
    summary: "Show an animal.",
    description: "Show an animal.",
    setup: SetupPolicy::NoSetup,
};

pub struct MooCmd;

impl Command for MooCmd {
    fn desc(&self) -> &'static CmdDesc {
        &MOO_DESC
    }

    fn execute(&mut self, session: &mut Session, _args: &[String]) -> i32 {
        // a hedgehog
        session.out.info(
            r"   \\\\\
  \\\\\\\__o
__\\\\\\\'/_",
        );
        EXIT_OK
    }
}

static WHAT_PROVIDES_DESC: CmdDesc = CmdDesc {
    aliases: &["what-provides", "wp"],
    synopsis: &["what-provides (wp) <CAPABILITY>"],
    summary: "List packages providing specified capability.",
    description: "List all packages providing the specified capability. The command is an \
alias for a provides search with exact matching.",
    setup: SetupPolicy::NoSetup,
};

/// Compatibility alias: the work is one exact provides-search delegated to
/// the resolver.
pub struct WhatProvidesCmd;

impl Command for WhatProvidesCmd {
    fn desc(&self) -> &'static CmdDesc {
        &WHAT_PROVIDES_DESC
    }

    fn execute(&mut self, session: &mut Session, args: &[String]) -> i32 {
        if args.is_empty() {
            let help = help_text(self);
            report_too_few_arguments(&mut session.out, &help);
            return EXIT_ERR_INVALID_ARGS;
        }

        session
            .out
            .info("Command 'what-provides' performs a search for exact capability providers.");

        let query = SearchQuery {
            attribute: SearchAttribute::Provides,
            mode: MatchMode::Exact,
            terms: args.to_vec(),
        };
        match session.search(&query) {
            Ok(()) => session.exit_code(),
            Err(e) => {
                session.out.error(e.to_string());
                EXIT_ERR_REPO
            }
        }
    }
}
