// src/output.rs

//! User-facing output sink
//!
//! All user-visible text flows through [`Output`]: informational messages on
//! stdout, warnings and errors on stderr, gated by verbosity. The sink also
//! carries the current process exit status. Collaborators may record a
//! non-OK status while still returning success (e.g. a partially applied
//! multi-repository file), and commands report whatever status is current
//! after a delegated call instead of assuming a hardcoded OK.

use std::io::Write;

use crate::error::EXIT_OK;

/// How much output the user asked for.
///
/// Messages carry the minimum verbosity at which they appear; `Quiet`
/// messages are always shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    High,
    Debug,
}

/// Output sink plus ambient exit status.
pub struct Output {
    verbosity: Verbosity,
    exit_code: i32,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl Output {
    /// Create a sink writing to the real stdout/stderr.
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_writers(
            verbosity,
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }

    /// Create a sink with injected writers. Tests use this to capture
    /// everything a command prints.
    pub fn with_writers(
        verbosity: Verbosity,
        stdout: Box<dyn Write>,
        stderr: Box<dyn Write>,
    ) -> Self {
        Self {
            verbosity,
            exit_code: EXIT_OK,
            stdout,
            stderr,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// The current exit status recorded on the sink.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Record an exit status. Later calls overwrite earlier ones.
    pub fn set_exit_code(&mut self, code: i32) {
        self.exit_code = code;
    }

    /// Informational message, shown at `Normal` and above.
    pub fn info(&mut self, msg: impl AsRef<str>) {
        self.info_at(msg, Verbosity::Normal);
    }

    /// Informational message shown only at the given verbosity or above.
    pub fn info_at(&mut self, msg: impl AsRef<str>, min: Verbosity) {
        if self.verbosity >= min {
            let _ = writeln!(self.stdout, "{}", msg.as_ref());
        }
    }

    /// Warning, shown at `Normal` and above.
    pub fn warning(&mut self, msg: impl AsRef<str>) {
        self.warning_at(msg, Verbosity::Normal);
    }

    /// Warning shown at the given verbosity or above. `Quiet` warnings are
    /// printed even under `--quiet`.
    pub fn warning_at(&mut self, msg: impl AsRef<str>, min: Verbosity) {
        if self.verbosity >= min || min == Verbosity::Quiet {
            let _ = writeln!(self.stderr, "Warning: {}", msg.as_ref());
        }
    }

    /// Error message. Always shown.
    pub fn error(&mut self, msg: impl AsRef<str>) {
        let _ = writeln!(self.stderr, "Error: {}", msg.as_ref());
    }

    /// Error message followed by a corrective hint.
    pub fn error_with_hint(&mut self, msg: impl AsRef<str>, hint: impl AsRef<str>) {
        self.error(msg);
        let _ = writeln!(self.stderr, "{}", hint.as_ref());
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("verbosity", &self.verbosity)
            .field("exit_code", &self.exit_code)
            .finish_non_exhaustive()
    }
}
