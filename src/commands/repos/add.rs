// src/commands/repos/add.rs

//! The `addrepo` command
//!
//! One or two positional arguments: either a URI pointing to a `.repo`
//! file, or a `URI ALIAS` pair. Which manager call to delegate to is
//! decided from the argument count plus a syntactic `.repo` test, never by
//! looking at content.

use url::Url;

use crate::commands::conditions::{Condition, NeedsRoot};
use crate::commands::{
    CmdDesc, Command, SetupPolicy, help_text, report_too_few_arguments,
    report_too_many_arguments,
};
use crate::error::{EXIT_ERR_BUG, EXIT_ERR_INVALID_ARGS, EXIT_ERR_REPO};
use crate::flags::{Arity, Binding, FlagDef, OptionGroup};
use crate::output::{Output, Verbosity};
use crate::repository::{CommonProperties, ProbePolicy, RepoError, RepoProperties, urls};
use crate::session::Session;

static DESC: CmdDesc = CmdDesc {
    aliases: &["addrepo", "ar"],
    synopsis: &[
        "addrepo (ar) [OPTIONS] <URI> <ALIAS>",
        "addrepo (ar) [OPTIONS] <FILE.repo>",
    ],
    summary: "Add a new repository.",
    description: "Add a repository to the system. The repository can be specified by its URI \
or can be read from specified .repo file (even remote).",
    setup: SetupPolicy::ResetRepoManager,
};

#[derive(Default)]
pub struct AddRepoCmd {
    repo_file: Option<String>,
    enable_check: bool,
    disable_check: bool,
    name: Option<String>,
    enable: bool,
    disable: bool,
    refresh: bool,
    no_refresh: bool,
    priority: Option<String>,
    keep_packages: bool,
    no_keep_packages: bool,
}

/// Resolve a pair of mutually exclusive boolean flags. Both set is not an
/// error: warn and fall back to the default.
fn resolve_pair(out: &mut Output, yes: bool, no: bool, yes_flag: &str, no_flag: &str) -> Option<bool> {
    match (yes, no) {
        (true, true) => {
            out.warning_at(
                format!("Cannot use {yes_flag} together with {no_flag}. Using the default."),
                Verbosity::Quiet,
            );
            None
        }
        (true, false) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

impl AddRepoCmd {
    fn probe_policy(&self, out: &mut Output) -> ProbePolicy {
        match (self.enable_check, self.disable_check) {
            (true, true) => {
                out.warning_at(
                    "Cannot use --check together with --no-check. Using the probe_on_add \
                     setting from the configuration.",
                    Verbosity::Quiet,
                );
                ProbePolicy::Unspecified
            }
            (true, false) => ProbePolicy::ForceEnable,
            (false, true) => ProbePolicy::ForceDisable,
            (false, false) => ProbePolicy::Unspecified,
        }
    }

    fn add_from_file(
        &mut self,
        session: &mut Session,
        path: &str,
        common: &CommonProperties,
        props: &RepoProperties,
        probe: ProbePolicy,
    ) -> i32 {
        match session.add_repo_from_file(path, common, props, probe) {
            Ok(()) => session.exit_code(),
            Err(e) => report_repo_error(session, e),
        }
    }
}

/// Translate a manager domain error into a message and exit code.
fn report_repo_error(session: &mut Session, err: RepoError) -> i32 {
    match err {
        RepoError::UnknownType(_) => {
            session.out.error_with_hint(
                format!("Specified type is not a valid repository type: {err}"),
                "See 'satchel help addrepo' or 'man satchel' to get a list of known \
                 repository types.",
            );
            EXIT_ERR_INVALID_ARGS
        }
        other => {
            session.out.error(other.to_string());
            EXIT_ERR_REPO
        }
    }
}

impl Command for AddRepoCmd {
    fn desc(&self) -> &'static CmdDesc {
        &DESC
    }

    fn conditions(&self) -> Vec<Box<dyn Condition>> {
        vec![Box::new(NeedsRoot)]
    }

    fn options(&mut self) -> OptionGroup<'_> {
        OptionGroup::new(vec![
            FlagDef::new(
                "repo",
                Some('r'),
                Arity::Required,
                "Just another means to specify a .repo file to read.",
                Binding::Value { dest: &mut self.repo_file },
            )
            .hint("FILE"),
            FlagDef::new(
                "check",
                Some('c'),
                Arity::None,
                "Probe URI.",
                Binding::Flag { dest: &mut self.enable_check, value: true },
            ),
            FlagDef::new(
                "no-check",
                Some('C'),
                Arity::None,
                "Don't probe URI, probe later during refresh.",
                Binding::Flag { dest: &mut self.disable_check, value: true },
            ),
            FlagDef::new(
                "type",
                Some('t'),
                Arity::Required,
                "The repository type is always autodetected. This option is ignored.",
                Binding::Warn {
                    message: "Ignoring deprecated option '--type'; the repository type is \
                              always autodetected."
                        .to_string(),
                },
            )
            .hint("TYPE")
            .deprecated(),
            FlagDef::new(
                "name",
                Some('n'),
                Arity::Required,
                "Specify descriptive name for the repository.",
                Binding::Value { dest: &mut self.name },
            )
            .hint("NAME"),
            FlagDef::new(
                "enable",
                Some('e'),
                Arity::None,
                "Add the repository enabled (default).",
                Binding::Flag { dest: &mut self.enable, value: true },
            ),
            FlagDef::new(
                "disable",
                Some('d'),
                Arity::None,
                "Add the repository disabled.",
                Binding::Flag { dest: &mut self.disable, value: true },
            ),
            FlagDef::new(
                "refresh",
                Some('f'),
                Arity::None,
                "Enable autorefresh of the repository.",
                Binding::Flag { dest: &mut self.refresh, value: true },
            ),
            FlagDef::new(
                "no-refresh",
                Some('F'),
                Arity::None,
                "Disable autorefresh of the repository.",
                Binding::Flag { dest: &mut self.no_refresh, value: true },
            ),
            FlagDef::new(
                "priority",
                Some('p'),
                Arity::Required,
                "Set priority of the repository.",
                Binding::Value { dest: &mut self.priority },
            )
            .hint("N"),
            FlagDef::new(
                "keep-packages",
                Some('k'),
                Arity::None,
                "Keep downloaded packages.",
                Binding::Flag { dest: &mut self.keep_packages, value: true },
            ),
            FlagDef::new(
                "no-keep-packages",
                Some('K'),
                Arity::None,
                "Don't keep downloaded packages.",
                Binding::Flag { dest: &mut self.no_keep_packages, value: true },
            ),
        ])
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn execute(&mut self, session: &mut Session, args: &[String]) -> i32 {
        if args.len() > 2 {
            let help = help_text(self);
            report_too_many_arguments(&mut session.out, &help);
            return EXIT_ERR_INVALID_ARGS;
        }

        let probe = self.probe_policy(&mut session.out);

        let priority = match &self.priority {
            Some(raw) => match raw.parse::<u32>() {
                Ok(p) if p > 0 => Some(p),
                _ => {
                    session
                        .out
                        .error(format!("Invalid priority '{raw}'. Use a positive integer."));
                    return EXIT_ERR_INVALID_ARGS;
                }
            },
            None => None,
        };
        let common = CommonProperties {
            name: self.name.clone(),
            enabled: resolve_pair(
                &mut session.out,
                self.enable,
                self.disable,
                "--enable",
                "--disable",
            ),
            autorefresh: resolve_pair(
                &mut session.out,
                self.refresh,
                self.no_refresh,
                "--refresh",
                "--no-refresh",
            ),
        };
        let props = RepoProperties {
            priority,
            keep_packages: resolve_pair(
                &mut session.out,
                self.keep_packages,
                self.no_keep_packages,
                "--keep-packages",
                "--no-keep-packages",
            ),
        };

        // a .repo file named via --repo wins over positional interpretation
        if let Some(file) = self.repo_file.clone() {
            return self.add_from_file(session, &file, &common, &props, probe);
        }

        match args.len() {
            0 => {
                let help = help_text(self);
                report_too_few_arguments(&mut session.out, &help);
                EXIT_ERR_INVALID_ARGS
            }
            1 => {
                if !urls::is_repo_file(&args[0]) {
                    let help = help_text(self);
                    session
                        .out
                        .error("If only one argument is used, it must be a URI pointing to a .repo file.");
                    session.out.info(help.trim_end());
                    return EXIT_ERR_INVALID_ARGS;
                }
                let path = args[0].clone();
                self.add_from_file(session, &path, &common, &props, probe)
            }
            _ => {
                let url = if args[0].starts_with("obs:") {
                    let base = match Url::parse(&session.config.obs_base_url) {
                        Ok(base) => base,
                        Err(_) => {
                            session.out.error(format!(
                                "Configured obs_base_url '{}' is not a valid URL.",
                                session.config.obs_base_url
                            ));
                            return EXIT_ERR_BUG;
                        }
                    };
                    urls::make_obs_url(&args[0], &base, &session.config.obs_platform)
                } else {
                    urls::make_url(&args[0])
                };
                let url = match url {
                    Ok(url) => url,
                    Err(e) => {
                        session.out.error(e.to_string());
                        return EXIT_ERR_INVALID_ARGS;
                    }
                };

                // make trusted keys available before the first remote contact
                if let Err(e) = session.load_trusted_keys() {
                    session.out.error(e.to_string());
                    return EXIT_ERR_REPO;
                }

                match session.add_repo_by_url(&url, &args[1], &common, &props, probe) {
                    Ok(()) => session.exit_code(),
                    Err(e) => report_repo_error(session, e),
                }
            }
        }
    }
}
