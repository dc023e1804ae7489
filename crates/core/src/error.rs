use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// How serious a diagnostic is. Only errors stop a compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// What went wrong. Each kind belongs to one category of the error taxonomy,
/// see [`DiagnosticKind::category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MalformedTag,
    UnmatchedClose,
    DuplicateOpen,
    UnclosedSection,
    UnknownKey,
    DuplicateKey,
    StrayContent,
    MissingHeader,
    Context,
    SpecViolation,
    SpecUnavailable,
    Completeness,
    Order,
    Alternation,
    Reference,
}

impl DiagnosticKind {
    /// Taxonomy bucket reported to users and editors.
    pub fn category(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedTag
            | DiagnosticKind::UnmatchedClose
            | DiagnosticKind::DuplicateOpen
            | DiagnosticKind::UnclosedSection
            | DiagnosticKind::UnknownKey
            | DiagnosticKind::DuplicateKey
            | DiagnosticKind::StrayContent
            | DiagnosticKind::MissingHeader => "StructuralError",
            DiagnosticKind::Context => "ContextError",
            DiagnosticKind::SpecViolation => "SpecViolation",
            DiagnosticKind::SpecUnavailable => "SpecUnavailableError",
            DiagnosticKind::Completeness => "CompletenessError",
            DiagnosticKind::Order => "OrderError",
            DiagnosticKind::Alternation => "AlternationError",
            DiagnosticKind::Reference => "ReferenceWarning",
        }
    }

    /// Short machine-readable code, also used as the LSP diagnostic code.
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedTag => "malformed-tag",
            DiagnosticKind::UnmatchedClose => "unmatched-close",
            DiagnosticKind::DuplicateOpen => "duplicate-open",
            DiagnosticKind::UnclosedSection => "unclosed-section",
            DiagnosticKind::UnknownKey => "unknown-key",
            DiagnosticKind::DuplicateKey => "duplicate-key",
            DiagnosticKind::StrayContent => "stray-content",
            DiagnosticKind::MissingHeader => "missing-header",
            DiagnosticKind::Context => "context",
            DiagnosticKind::SpecViolation => "spec-violation",
            DiagnosticKind::SpecUnavailable => "spec-unavailable",
            DiagnosticKind::Completeness => "completeness",
            DiagnosticKind::Order => "order",
            DiagnosticKind::Alternation => "alternation",
            DiagnosticKind::Reference => "reference",
        }
    }

    /// Fatal kinds abort the document under every policy.
    pub fn is_fatal(self) -> bool {
        matches!(self, DiagnosticKind::SpecUnavailable)
    }
}

/// Column range on a single line, in characters, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }
}

/// One reported problem in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// 1-based source line.
    pub line: u32,
    pub span: Span,
    /// The tag the diagnostic is about, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, line: u32, span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            kind,
            line,
            span,
            tag: None,
            message: message.into(),
        }
    }

    pub fn warning(
        kind: DiagnosticKind,
        line: u32,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(kind, line, span, message)
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Serialize with every field present (null for a missing tag), for the
    /// CLI's JSON error output.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "category": self.kind.category(),
            "kind":     self.kind,
            "line":     self.line,
            "message":  self.message,
            "severity": self.severity,
            "span":     { "start": self.span.start, "end": self.span.end },
            "tag":      self.tag,
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}:{}: {} [{}]",
            self.line,
            self.span.start + 1,
            self.severity,
            self.kind.category()
        )?;
        if let Some(tag) = &self.tag {
            write!(f, " in '{}'", tag)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Why a compile did not produce a document.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    /// The first error the scan hit. Warnings reported before it are kept.
    #[error("{diagnostic}")]
    Rejected {
        diagnostic: Diagnostic,
        warnings: Vec<Diagnostic>,
    },
    #[error("compilation cancelled")]
    Cancelled,
}

impl CompileError {
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            CompileError::Rejected { diagnostic, .. } => Some(diagnostic),
            CompileError::Cancelled => None,
        }
    }
}

/// Errors from an [`AssignmentSpecProvider`](crate::assignment::AssignmentSpecProvider).
#[derive(Debug, thiserror::Error)]
pub enum SpecLoadError {
    #[error("no assignment spec found for assignment {0}")]
    NotFound(String),
    #[error("could not read assignment spec {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed assignment spec for assignment {assignment}: {message}")]
    Malformed { assignment: String, message: String },
}
