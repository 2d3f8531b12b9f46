// src/main.rs

use std::path::Path;
use std::process;

use anyhow::{Context, Result};

use satchel::commands::{self, CommandRegistry};
use satchel::config::Config;
use satchel::flags::{self, Arity, Binding, FlagDef, OptionGroup};
use satchel::output::{Output, Verbosity};
use satchel::repository::SystemRepoManager;
use satchel::session::Session;
use satchel::{EXIT_ERR_BUG, EXIT_ERR_SYNTAX, EXIT_OK};

/// Options parsed before the command alias.
#[derive(Default)]
struct GlobalOpts {
    help: bool,
    version: bool,
    quiet: bool,
    verbose: bool,
    debug: bool,
    config: Option<String>,
}

impl GlobalOpts {
    fn verbosity(&self) -> Verbosity {
        if self.debug {
            Verbosity::Debug
        } else if self.verbose {
            Verbosity::High
        } else if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }
}

fn global_options(opts: &mut GlobalOpts) -> OptionGroup<'_> {
    OptionGroup::new(vec![
        FlagDef::new(
            "help",
            Some('h'),
            Arity::None,
            "Print help and exit.",
            Binding::Flag { dest: &mut opts.help, value: true },
        ),
        FlagDef::new(
            "version",
            Some('V'),
            Arity::None,
            "Print version and exit.",
            Binding::Flag { dest: &mut opts.version, value: true },
        ),
        FlagDef::new(
            "quiet",
            Some('q'),
            Arity::None,
            "Suppress normal output.",
            Binding::Flag { dest: &mut opts.quiet, value: true },
        ),
        FlagDef::new(
            "verbose",
            Some('v'),
            Arity::None,
            "Increase verbosity.",
            Binding::Flag { dest: &mut opts.verbose, value: true },
        ),
        FlagDef::new(
            "debug",
            None,
            Arity::None,
            "Print debug output.",
            Binding::Flag { dest: &mut opts.debug, value: true },
        )
        .hidden(),
        FlagDef::new(
            "config",
            None,
            Arity::Required,
            "Use the specified configuration file.",
            Binding::Value { dest: &mut opts.config },
        )
        .hint("FILE"),
    ])
}

/// Split the raw arguments into global options and the command invocation.
///
/// Everything up to the first non-option token is global; that token and
/// the rest belong to the command.
fn split_global(argv: &[String]) -> (&[String], &[String]) {
    let mut boundary = argv.len();
    let mut i = 0;
    while i < argv.len() {
        let token = &argv[i];
        if !token.starts_with('-') || token == "-" || token == "--" {
            boundary = i;
            break;
        }
        // --config takes a value, possibly as the following token
        if token == "--config" {
            i += 2;
        } else {
            i += 1;
        }
    }
    argv.split_at(boundary.min(argv.len()))
}

fn run() -> Result<i32> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let (global, invocation) = split_global(&argv);

    let mut opts = GlobalOpts::default();
    let mut out = Output::new(Verbosity::Normal);
    {
        let mut group = global_options(&mut opts);
        if let Err(e) = flags::parse(&mut out, &mut group, global) {
            drop(group);
            out.error(e.to_string());
            out.info("Run 'satchel help' for usage.");
            return Ok(EXIT_ERR_SYNTAX);
        }
    }
    out.set_verbosity(opts.verbosity());

    if opts.version {
        out.info(format!("satchel {}", env!("CARGO_PKG_VERSION")));
        return Ok(EXIT_OK);
    }

    let config = Config::load(opts.config.as_deref().map(Path::new))
        .context("failed to load configuration")?;
    let manager = SystemRepoManager::new(&config);
    let mut session = Session::new(config, out, Box::new(manager));
    let mut registry = CommandRegistry::with_defaults();

    if opts.help || invocation.is_empty() {
        commands::print_usage(&mut session.out, &registry);
        return Ok(EXIT_OK);
    }

    Ok(commands::run(&mut session, &mut registry, invocation))
}

fn main() {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            EXIT_ERR_BUG
        }
    };
    process::exit(code);
}
