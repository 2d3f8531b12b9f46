// src/flags.rs

//! Declarative command line option model
//!
//! Each command describes its options as a set of [`FlagDef`]s: names,
//! arity, help text, and a [`Binding`] that writes the parsed value into a
//! field borrowed from the command itself. The parser walks the raw
//! argument vector once, applying bindings as it matches tokens and
//! collecting everything else as positional arguments.
//!
//! Long options are matched as `--name` or `--name=value`; short options as
//! `-x`, `-xVALUE`, `-x VALUE`, and may be clustered (`-cC`) as long as
//! only the last flag in the cluster takes an argument. Tokens after a
//! literal `--` are always positional.
//!
//! Deprecated options keep parsing so existing scripts keep working; their
//! binding emits a warning through the output sink instead of storing a
//! value.

use thiserror::Error;
use tracing::trace;

use crate::output::Output;

/// Option parsing errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FlagError {
    /// Token looked like an option but matched no descriptor
    #[error("unknown option '{0}'")]
    Unknown(String),

    /// A required-argument option had no value
    #[error("option '{0}' requires an argument")]
    MissingArgument(String),

    /// Two descriptors in one command share a name. Construction-time
    /// defect; the registry validation test catches it.
    #[error("duplicate option name '{0}' in command definition")]
    DuplicateName(String),
}

/// Whether an option takes an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No argument; an attached `=value` is ignored.
    None,
    /// Argument required, attached or as the following token.
    Required,
    /// Attached argument only; the declared default is used when absent.
    Optional,
}

/// How a matched option is applied.
pub enum Binding<'a> {
    /// Store a constant into a boolean field.
    Flag { dest: &'a mut bool, value: bool },
    /// Store the argument into a string field.
    Value { dest: &'a mut Option<String> },
    /// Emit a warning through the output sink; any argument is consumed and
    /// discarded. Used for deprecated options.
    Warn { message: String },
}

/// One command line option descriptor.
pub struct FlagDef<'a> {
    long: &'static str,
    short: Option<char>,
    arity: Arity,
    help: &'static str,
    hint: &'static str,
    deprecated: bool,
    hidden: bool,
    default: Option<&'static str>,
    binding: Binding<'a>,
}

impl<'a> FlagDef<'a> {
    pub fn new(
        long: &'static str,
        short: Option<char>,
        arity: Arity,
        help: &'static str,
        binding: Binding<'a>,
    ) -> Self {
        Self {
            long,
            short,
            arity,
            help,
            hint: "ARG",
            deprecated: false,
            hidden: false,
            default: None,
            binding,
        }
    }

    /// Placeholder shown for the argument in help output, e.g. `FILE`.
    pub fn hint(mut self, hint: &'static str) -> Self {
        self.hint = hint;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Value stored when an optional-argument flag appears without one.
    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub fn long(&self) -> &'static str {
        self.long
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn help_text(&self) -> &'static str {
        self.help
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The option as it appears in the help table: `-r, --repo <FILE>`.
    pub fn usage_term(&self) -> String {
        let mut term = match self.short {
            Some(c) => format!("-{}, --{}", c, self.long),
            None => format!("    --{}", self.long),
        };
        match self.arity {
            Arity::None => {}
            Arity::Required => term.push_str(&format!(" <{}>", self.hint)),
            Arity::Optional => term.push_str(&format!(" [{}]", self.hint)),
        }
        term
    }

    fn apply(&mut self, out: &mut Output, value: Option<&str>) {
        match &mut self.binding {
            Binding::Flag { dest, value } => **dest = *value,
            Binding::Value { dest } => {
                if let Some(v) = value {
                    **dest = Some(v.to_string());
                }
            }
            Binding::Warn { message } => out.warning(message.as_str()),
        }
    }
}

/// The full option set a command accepts for one parse cycle.
#[derive(Default)]
pub struct OptionGroup<'a> {
    defs: Vec<FlagDef<'a>>,
}

impl<'a> OptionGroup<'a> {
    pub fn new(defs: Vec<FlagDef<'a>>) -> Self {
        Self { defs }
    }

    pub fn push(&mut self, def: FlagDef<'a>) {
        self.defs.push(def);
    }

    pub fn defs(&self) -> &[FlagDef<'a>] {
        &self.defs
    }

    /// Long and short names must be pairwise unique within one command.
    pub fn validate(&self) -> Result<(), FlagError> {
        for (i, def) in self.defs.iter().enumerate() {
            for other in &self.defs[i + 1..] {
                if def.long == other.long {
                    return Err(FlagError::DuplicateName(format!("--{}", def.long)));
                }
                if let (Some(a), Some(b)) = (def.short, other.short)
                    && a == b
                {
                    return Err(FlagError::DuplicateName(format!("-{a}")));
                }
            }
        }
        Ok(())
    }

    fn find_long(&self, name: &str) -> Option<usize> {
        self.defs.iter().position(|d| d.long == name)
    }

    fn find_short(&self, c: char) -> Option<usize> {
        self.defs.iter().position(|d| d.short == Some(c))
    }
}

/// Parse `argv` against `group`, applying bindings as options match.
///
/// Returns the positional arguments in order. Deprecation warnings go
/// through `out`; the first malformed token aborts the parse.
pub fn parse(
    out: &mut Output,
    group: &mut OptionGroup<'_>,
    argv: &[String],
) -> Result<Vec<String>, FlagError> {
    group.validate()?;

    let mut positional = Vec::new();
    let mut i = 0;
    while i < argv.len() {
        let token = &argv[i];
        if token == "--" {
            positional.extend(argv[i + 1..].iter().cloned());
            break;
        }
        if let Some(body) = token.strip_prefix("--") {
            let (name, attached) = match body.split_once('=') {
                Some((n, v)) => (n, Some(v)),
                None => (body, None),
            };
            let idx = group
                .find_long(name)
                .ok_or_else(|| FlagError::Unknown(format!("--{name}")))?;
            let value = match group.defs[idx].arity {
                Arity::None => None,
                Arity::Required => match attached {
                    Some(v) => Some(v.to_string()),
                    None => {
                        i += 1;
                        Some(
                            argv.get(i)
                                .ok_or_else(|| FlagError::MissingArgument(format!("--{name}")))?
                                .clone(),
                        )
                    }
                },
                Arity::Optional => attached
                    .map(str::to_string)
                    .or_else(|| group.defs[idx].default.map(str::to_string)),
            };
            trace!(option = name, "matched long option");
            group.defs[idx].apply(out, value.as_deref());
        } else if token.len() > 1 && token.starts_with('-') {
            let mut rest = &token[1..];
            while let Some(c) = rest.chars().next() {
                rest = &rest[c.len_utf8()..];
                let idx = group
                    .find_short(c)
                    .ok_or_else(|| FlagError::Unknown(format!("-{c}")))?;
                let value = match group.defs[idx].arity {
                    Arity::None => None,
                    Arity::Required => {
                        if rest.is_empty() {
                            i += 1;
                            Some(
                                argv.get(i)
                                    .ok_or_else(|| FlagError::MissingArgument(format!("-{c}")))?
                                    .clone(),
                            )
                        } else {
                            let v = rest.to_string();
                            rest = "";
                            Some(v)
                        }
                    }
                    Arity::Optional => {
                        if rest.is_empty() {
                            group.defs[idx].default.map(str::to_string)
                        } else {
                            let v = rest.to_string();
                            rest = "";
                            Some(v)
                        }
                    }
                };
                trace!(option = %c, "matched short option");
                group.defs[idx].apply(out, value.as_deref());
            }
        } else {
            positional.push(token.clone());
        }
        i += 1;
    }
    Ok(positional)
}
