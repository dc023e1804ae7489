//! Context-aware completion provider for ICS documents.
//!
//! Offers completions based on the sections open at the cursor: the tags
//! that may be opened there, the field keys of the innermost section, and
//! the close tag for the innermost section. Inside `ocaml-code` only the
//! close tag is offered.

use ics_core::grammar::Tag;
use ics_core::outline::open_sections_at;
use lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, Documentation, MarkupContent,
    MarkupKind, Position, Range, TextEdit,
};

/// Compute completions for the given position in the document.
pub fn compute_completions(position: Position, content: &str) -> Vec<CompletionItem> {
    let open = open_sections_at(content, position.line + 1);
    let innermost = open.last().copied();
    let replace = replace_range(content, position);

    let mut items = Vec::new();
    if innermost == Some(Tag::OcamlCode) {
        add_close_completion(Tag::OcamlCode, replace, &mut items);
        return items;
    }

    for tag in Tag::legal_children(innermost) {
        items.push(CompletionItem {
            label: format!("<<{}", tag.name()),
            kind: Some(CompletionItemKind::KEYWORD),
            detail: Some("open section".to_string()),
            documentation: Some(markdown(tag.description())),
            text_edit: Some(edit(replace, format!("<<{}", tag.name()))),
            ..Default::default()
        });
    }

    if let Some(section) = innermost {
        for key in section.keys() {
            items.push(CompletionItem {
                label: format!("{}:", key),
                kind: Some(CompletionItemKind::PROPERTY),
                detail: Some(format!("{} field", section.name())),
                text_edit: Some(edit(replace, format!("{}: ", key))),
                ..Default::default()
            });
        }
        add_close_completion(section, replace, &mut items);
    }

    items
}

fn add_close_completion(tag: Tag, replace: Range, items: &mut Vec<CompletionItem>) {
    items.push(CompletionItem {
        label: format!("{}>>", tag.name()),
        kind: Some(CompletionItemKind::KEYWORD),
        detail: Some("close section".to_string()),
        text_edit: Some(edit(replace, format!("{}>>", tag.name()))),
        // Closing is the most likely action once a section has content.
        sort_text: Some("0".to_string()),
        ..Default::default()
    });
}

/// From the first non-blank character of the line up to the cursor.
fn replace_range(content: &str, position: Position) -> Range {
    let line = content.lines().nth(position.line as usize).unwrap_or("");
    let indent = line.chars().take_while(|c| c.is_whitespace()).count() as u32;
    let start = indent.min(position.character);
    Range::new(
        Position::new(position.line, start),
        Position::new(position.line, position.character),
    )
}

fn edit(range: Range, new_text: String) -> CompletionTextEdit {
    CompletionTextEdit::Edit(TextEdit { range, new_text })
}

fn markdown(text: &str) -> Documentation {
    Documentation::MarkupContent(MarkupContent {
        kind: MarkupKind::Markdown,
        value: text.to_string(),
    })
}
