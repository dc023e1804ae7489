pub(crate) mod compile;
pub(crate) mod lint;
pub(crate) mod vocab;

use std::path::Path;

use ics_core::Diagnostic;

/// `file:line:col: severity[kind]: message`, the layout editors and
/// terminals turn into links.
pub(crate) fn format_diagnostic(file: &Path, diag: &Diagnostic) -> String {
    let mut message = diag.message.clone();
    if let Some(tag) = &diag.tag {
        message = format!("{} (in '{}')", message, tag);
    }
    format!(
        "{}:{}:{}: {}[{}]: {}",
        file.display(),
        diag.line,
        diag.span.start + 1,
        diag.severity,
        diag.kind.code(),
        message
    )
}

pub(crate) fn read_source(file: &Path) -> Result<String, String> {
    std::fs::read_to_string(file).map_err(|e| format!("error reading file '{}': {}", file.display(), e))
}
