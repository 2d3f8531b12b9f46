// src/commands/mod.rs

//! Command framework and dispatch
//!
//! Commands are declared, not wired by hand: each one carries a static
//! [`CmdDesc`] (aliases, synopsis, summary, description, setup policy),
//! describes its options as flag descriptors, names its preconditions, and
//! implements `execute`. The dispatcher resolves the invoked alias through
//! a registry built once at startup and drives the shared lifecycle:
//!
//! reset → setup policy → parse options → check conditions → execute
//!
//! A command instance is reused across repeated invocations in one
//! process; `reset()` must return every mutable field to its default so no
//! flag value survives between parses.

pub mod conditions;
mod nullcommands;
mod repos;
mod system_architecture;

pub use nullcommands::{MooCmd, WhatProvidesCmd};
pub use repos::AddRepoCmd;
pub use system_architecture::SystemArchitectureCmd;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{EXIT_ERR_REPO, EXIT_ERR_SYNTAX, EXIT_OK};
use crate::flags::{self, Arity, Binding, FlagDef, FlagError, OptionGroup};
use crate::output::Output;
use crate::session::Session;

use conditions::Condition;

/// Global setup the dispatcher performs before a command executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupPolicy {
    /// Warm the repository manager.
    Standard,
    /// Drop the repository manager's cached state, then warm it fresh.
    ResetRepoManager,
    /// Skip ambient preparation entirely.
    NoSetup,
}

/// Static identity and documentation of one command.
pub struct CmdDesc {
    /// Invocation names; the first one is canonical. Never empty.
    pub aliases: &'static [&'static str],
    /// Usage lines shown at the top of the help text.
    pub synopsis: &'static [&'static str],
    /// One-line summary.
    pub summary: &'static str,
    /// Longer description.
    pub description: &'static str,
    pub setup: SetupPolicy,
}

/// The declarative command contract.
pub trait Command {
    fn desc(&self) -> &'static CmdDesc;

    /// The flag descriptors this command accepts. Bindings borrow the
    /// command's own fields; the dispatcher adds the generic `--help`.
    fn options(&mut self) -> OptionGroup<'_> {
        OptionGroup::default()
    }

    /// Preconditions, evaluated in order before `execute`.
    fn conditions(&self) -> Vec<Box<dyn Condition>> {
        Vec::new()
    }

    /// Return all per-invocation state to defaults. Commands that bind
    /// flags must override this; it runs before every parse.
    fn reset(&mut self) {}

    /// Perform the command. Failures are reported through the session's
    /// output sink and translated to an exit code here; nothing escapes.
    fn execute(&mut self, session: &mut Session, args: &[String]) -> i32;
}

/// Render a command's help: usage lines, summary, description, options.
pub fn help_text(cmd: &mut dyn Command) -> String {
    let desc = cmd.desc();
    let mut text = String::from("Usage:\n");
    for line in desc.synopsis {
        text.push_str("   ");
        text.push_str(line);
        text.push('\n');
    }
    text.push('\n');
    text.push_str(desc.summary);
    text.push_str("\n\n");
    text.push_str(desc.description);
    text.push('\n');

    let group = cmd.options();
    let visible: Vec<_> = group.defs().iter().filter(|d| !d.is_hidden()).collect();
    if !visible.is_empty() {
        text.push_str("\nOptions:\n");
        let width = visible
            .iter()
            .map(|d| d.usage_term().len())
            .max()
            .unwrap_or(0);
        for def in visible {
            let term = def.usage_term();
            text.push_str(&format!("  {term:width$}  {}\n", def.help_text()));
        }
    }
    text
}

/// Alias → command lookup, built once at startup.
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
    by_alias: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    pub fn new(commands: Vec<Box<dyn Command>>) -> Self {
        let mut by_alias = HashMap::new();
        for (idx, cmd) in commands.iter().enumerate() {
            let desc = cmd.desc();
            debug_assert!(!desc.aliases.is_empty(), "command without aliases");
            for alias in desc.aliases {
                let previous = by_alias.insert(*alias, idx);
                debug_assert!(previous.is_none(), "alias '{alias}' registered twice");
            }
        }
        Self { commands, by_alias }
    }

    /// All commands satchel ships.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Box::new(AddRepoCmd::default()),
            Box::new(MooCmd),
            Box::new(WhatProvidesCmd),
            Box::new(SystemArchitectureCmd),
        ])
    }

    pub fn find(&mut self, alias: &str) -> Option<&mut Box<dyn Command>> {
        let idx = *self.by_alias.get(alias)?;
        Some(&mut self.commands[idx])
    }

    /// Descriptors of every registered command, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &'static CmdDesc> + '_ {
        self.commands.iter().map(|c| c.desc())
    }

    /// Construction-time invariant: no command's flag set collides.
    pub fn validate(&mut self) -> Result<(), FlagError> {
        for cmd in &mut self.commands {
            cmd.options().validate()?;
        }
        Ok(())
    }
}

/// Print the top-level usage listing.
pub fn print_usage(out: &mut Output, registry: &CommandRegistry) {
    out.info("Usage:\n   satchel [GLOBAL-OPTIONS] <COMMAND> [COMMAND-OPTIONS] [ARGUMENTS]\n");
    out.info("Commands:");
    for desc in registry.descriptors() {
        let mut names = desc.aliases[0].to_string();
        if desc.aliases.len() > 1 {
            names.push_str(&format!(" ({})", desc.aliases[1..].join(", ")));
        }
        out.info(format!("   {names:<28} {}", desc.summary));
    }
    out.info("\nRun 'satchel help <COMMAND>' for command-specific help.");
}

pub(crate) fn report_too_many_arguments(out: &mut Output, help: &str) {
    out.error("Too many arguments.");
    out.info(help.trim_end());
}

pub(crate) fn report_too_few_arguments(out: &mut Output, help: &str) {
    out.error("Too few arguments.");
    out.info(help.trim_end());
}

/// Resolve and run one command invocation, returning the process exit code.
pub fn run(session: &mut Session, registry: &mut CommandRegistry, argv: &[String]) -> i32 {
    let Some((alias, rest)) = argv.split_first() else {
        print_usage(&mut session.out, registry);
        return EXIT_OK;
    };

    // `help` is resolved by the dispatcher itself, not a registered command
    if alias == "help" {
        return match rest.first() {
            None => {
                print_usage(&mut session.out, registry);
                EXIT_OK
            }
            Some(name) => match registry.find(name) {
                Some(cmd) => {
                    let text = help_text(cmd.as_mut());
                    session.out.info(text.trim_end());
                    EXIT_OK
                }
                None => {
                    session.out.error(format!("Unknown command '{name}'."));
                    EXIT_ERR_SYNTAX
                }
            },
        };
    }

    let Some(cmd) = registry.find(alias) else {
        session.out.error(format!("Unknown command '{alias}'."));
        session
            .out
            .info("Run 'satchel help' to see all available commands.");
        return EXIT_ERR_SYNTAX;
    };
    debug!(command = %alias, "dispatching");

    cmd.reset();

    match cmd.desc().setup {
        SetupPolicy::Standard => {
            if let Err(e) = session.prepare() {
                session.out.error(e.to_string());
                return EXIT_ERR_REPO;
            }
        }
        SetupPolicy::ResetRepoManager => {
            session.reset_repo_manager();
            if let Err(e) = session.prepare() {
                session.out.error(e.to_string());
                return EXIT_ERR_REPO;
            }
        }
        SetupPolicy::NoSetup => {}
    }

    let mut want_help = false;
    let positional = {
        let mut group = cmd.options();
        group.push(FlagDef::new(
            "help",
            Some('h'),
            Arity::None,
            "Print this help and exit.",
            Binding::Flag {
                dest: &mut want_help,
                value: true,
            },
        ));
        match flags::parse(&mut session.out, &mut group, rest) {
            Ok(positional) => positional,
            Err(e) => {
                drop(group);
                session.out.error(e.to_string());
                session.out.info(help_text(cmd.as_mut()).trim_end());
                return EXIT_ERR_SYNTAX;
            }
        }
    };

    if want_help {
        let text = help_text(cmd.as_mut());
        session.out.info(text.trim_end());
        return EXIT_OK;
    }

    for condition in cmd.conditions() {
        if let Err(failure) = condition.check(session) {
            session.out.error(&failure.reason);
            return failure.exit_code;
        }
    }

    cmd.execute(session, &positional)
}

#[cfg(test)]
mod tests {
    use super::conditions::ConditionFailure;
    use super::*;
    use crate::session::tests::test_session;
    use std::cell::RefCell;
    use std::rc::Rc;

    static PROBE_DESC: CmdDesc = CmdDesc {
        aliases: &["probe", "pb"],
        synopsis: &["probe [OPTIONS]"],
        summary: "Exercise the dispatcher.",
        description: "Test-only command recording what the dispatcher does to it.",
        setup: SetupPolicy::NoSetup,
    };

    /// Orderly little command for lifecycle tests.
    #[derive(Default)]
    struct ProbeCmd {
        marker: bool,
        resets: Rc<RefCell<usize>>,
        executed: Rc<RefCell<Vec<(bool, Vec<String>)>>>,
        condition_log: Rc<RefCell<Vec<&'static str>>>,
        fail_first_condition: bool,
    }

    struct LoggingCondition {
        tag: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
        fail: bool,
    }

    impl Condition for LoggingCondition {
        fn check(&self, _session: &Session) -> Result<(), ConditionFailure> {
            self.log.borrow_mut().push(self.tag);
            if self.fail {
                Err(ConditionFailure {
                    reason: format!("condition {} failed", self.tag),
                    exit_code: 42,
                })
            } else {
                Ok(())
            }
        }
    }

    impl Command for ProbeCmd {
        fn desc(&self) -> &'static CmdDesc {
            &PROBE_DESC
        }

        fn options(&mut self) -> OptionGroup<'_> {
            OptionGroup::new(vec![FlagDef::new(
                "marker",
                Some('m'),
                Arity::None,
                "Set the marker.",
                Binding::Flag {
                    dest: &mut self.marker,
                    value: true,
                },
            )])
        }

        fn conditions(&self) -> Vec<Box<dyn Condition>> {
            vec![
                Box::new(LoggingCondition {
                    tag: "first",
                    log: self.condition_log.clone(),
                    fail: self.fail_first_condition,
                }),
                Box::new(LoggingCondition {
                    tag: "second",
                    log: self.condition_log.clone(),
                    fail: false,
                }),
            ]
        }

        fn reset(&mut self) {
            self.marker = false;
            *self.resets.borrow_mut() += 1;
        }

        fn execute(&mut self, _session: &mut Session, args: &[String]) -> i32 {
            self.executed.borrow_mut().push((self.marker, args.to_vec()));
            EXIT_OK
        }
    }

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_registry_resolves_every_alias() {
        let mut registry = CommandRegistry::with_defaults();
        for alias in ["addrepo", "ar", "moo", "what-provides", "wp", "system-architecture"] {
            assert!(registry.find(alias).is_some(), "alias '{alias}' not found");
        }
        assert!(registry.find("bogus").is_none());
    }

    #[test]
    fn test_default_registry_flag_sets_validate() {
        let mut registry = CommandRegistry::with_defaults();
        registry.validate().unwrap();
    }

    #[test]
    fn test_unknown_command_is_a_syntax_error() {
        let (mut session, _, _) = test_session();
        let mut registry = CommandRegistry::with_defaults();
        let code = run(&mut session, &mut registry, &args(&["frobnicate"]));
        assert_eq!(code, EXIT_ERR_SYNTAX);
    }

    #[test]
    fn test_lifecycle_reset_then_parse_then_execute() {
        let (mut session, _, _) = test_session();
        let cmd = ProbeCmd::default();
        let resets = cmd.resets.clone();
        let executed = cmd.executed.clone();
        let mut registry = CommandRegistry::new(vec![Box::new(cmd)]);

        let code = run(&mut session, &mut registry, &args(&["probe", "--marker", "x"]));
        assert_eq!(code, EXIT_OK);
        // a second invocation without the flag must not see stale state
        let code = run(&mut session, &mut registry, &args(&["pb", "y"]));
        assert_eq!(code, EXIT_OK);

        assert_eq!(*resets.borrow(), 2);
        let executed = executed.borrow();
        assert_eq!(executed[0], (true, vec!["x".to_string()]));
        assert_eq!(executed[1], (false, vec!["y".to_string()]));
    }

    #[test]
    fn test_conditions_fail_fast_in_order() {
        let (mut session, _, _) = test_session();
        let cmd = ProbeCmd {
            fail_first_condition: true,
            ..ProbeCmd::default()
        };
        let log = cmd.condition_log.clone();
        let executed = cmd.executed.clone();
        let mut registry = CommandRegistry::new(vec![Box::new(cmd)]);

        let code = run(&mut session, &mut registry, &args(&["probe"]));
        assert_eq!(code, 42);
        assert_eq!(*log.borrow(), vec!["first"]);
        assert!(executed.borrow().is_empty());
    }

    #[test]
    fn test_passing_conditions_run_in_order() {
        let (mut session, _, _) = test_session();
        let cmd = ProbeCmd::default();
        let log = cmd.condition_log.clone();
        let mut registry = CommandRegistry::new(vec![Box::new(cmd)]);

        run(&mut session, &mut registry, &args(&["probe"]));
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_generic_help_flag_skips_execution() {
        let (mut session, _, captured) = test_session();
        let cmd = ProbeCmd::default();
        let executed = cmd.executed.clone();
        let mut registry = CommandRegistry::new(vec![Box::new(cmd)]);

        let code = run(&mut session, &mut registry, &args(&["probe", "--help"]));
        assert_eq!(code, EXIT_OK);
        assert!(executed.borrow().is_empty());
        assert!(captured.stdout.contents().contains("probe [OPTIONS]"));
    }

    #[test]
    fn test_malformed_options_report_help_and_syntax_code() {
        let (mut session, _, captured) = test_session();
        let mut registry = CommandRegistry::new(vec![Box::new(ProbeCmd::default())]);
        let code = run(&mut session, &mut registry, &args(&["probe", "--bogus"]));
        assert_eq!(code, EXIT_ERR_SYNTAX);
        assert!(captured.stderr.contents().contains("unknown option '--bogus'"));
        assert!(captured.stdout.contents().contains("Usage:"));
    }

    #[test]
    fn test_help_pseudo_command() {
        let (mut session, _, captured) = test_session();
        let mut registry = CommandRegistry::with_defaults();
        let code = run(&mut session, &mut registry, &args(&["help", "addrepo"]));
        assert_eq!(code, EXIT_OK);
        assert!(captured.stdout.contents().contains("addrepo (ar) [OPTIONS]"));
    }

    #[test]
    fn test_help_text_section_order() {
        let mut registry = CommandRegistry::with_defaults();
        let cmd = registry.find("addrepo").unwrap();
        let text = help_text(cmd.as_mut());
        let usage = text.find("Usage:").unwrap();
        let summary = text.find("Add a new repository.").unwrap();
        let description = text.find("Add a repository to the system").unwrap();
        let options = text.find("Options:").unwrap();
        assert!(usage < summary);
        assert!(summary < description);
        assert!(description < options);
    }

    #[test]
    fn test_setup_policy_reset_reaches_manager() {
        let (mut session, recorded, _) = test_session();
        let mut registry = CommandRegistry::with_defaults();
        // addrepo resets the repository manager before running
        run(&mut session, &mut registry, &args(&["addrepo", "--help"]));
        assert_eq!(recorded.borrow().resets, 1);
        assert_eq!(recorded.borrow().attaches, 1);
    }

    #[test]
    fn test_no_setup_policy_skips_preparation() {
        let (mut session, recorded, _) = test_session();
        let mut registry = CommandRegistry::with_defaults();
        run(&mut session, &mut registry, &args(&["moo"]));
        assert_eq!(recorded.borrow().attaches, 0);
    }
}
