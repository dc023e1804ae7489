//! ics-core: parser and validator for ICS assignment documents.
//!
//! A document is a line-oriented tagged markup: `<<name metadata` opens a
//! section and `name>>` closes it. One scanner builds a typed [`Document`]
//! and checks every section against the assignment's [`AssignmentSpec`].
//!
//! - [`compile()`] stops at the first error and returns the document.
//! - [`lint()`] never stops early and returns every [`Diagnostic`].

pub mod assignment;
pub mod ast;
pub mod builder;
pub mod compile;
pub mod config;
pub mod error;
pub mod grammar;
pub mod outline;
pub mod policy;
pub mod sections;
pub mod source;
pub mod stack;

// ── Convenience re-exports ───────────────────────────────────────────

pub use assignment::{
    AssignmentSpec, AssignmentSpecProvider, CachedSpecProvider, DirectorySpecProvider,
    InMemorySpecProvider, ProblemSpec, SpecGate,
};
pub use ast::{Document, Header, Problem};
pub use builder::{BuildOutcome, DocumentBuilder, Halt};
pub use compile::{compile, lint, CompileOptions};
pub use config::{ConfigError, IcsConfig};
pub use error::{CompileError, Diagnostic, DiagnosticKind, Severity, Span, SpecLoadError};
pub use grammar::Tag;
pub use policy::{CollectAndContinue, DiagnosticPolicy, FailFast, Flow};
