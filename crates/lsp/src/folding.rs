//! Folding ranges for matched `<<name` / `name>>` pairs.

use ics_core::outline::section_ranges;
use lsp_types::{FoldingRange, FoldingRangeKind};

pub fn compute_folding_ranges(content: &str) -> Vec<FoldingRange> {
    section_ranges(content)
        .into_iter()
        .filter(|r| r.close_line > r.open_line)
        .map(|r| FoldingRange {
            start_line: r.open_line - 1,
            end_line: r.close_line - 1,
            kind: Some(FoldingRangeKind::Region),
            collapsed_text: Some(format!("<<{} ...", r.tag.name())),
            ..Default::default()
        })
        .collect()
}
