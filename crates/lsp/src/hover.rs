//! Hover information for tag names and field keys.

use ics_core::grammar::Tag;
use ics_core::outline::open_sections_at;
use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

/// Compute hover information for the token under the cursor.
///
/// A tag name (in `<<name` or `name>>`) shows the tag's description and
/// where it may appear. A field key shows which section it belongs to.
pub fn compute_hover(position: Position, content: &str) -> Option<Hover> {
    let line = content.lines().nth(position.line as usize)?;
    let word = word_at(line, position.character as usize)?;

    if let Some(tag) = Tag::from_name(&word) {
        return Some(make_hover(tag_markdown(tag)));
    }

    // Field keys are only meaningful inside their section.
    let open = open_sections_at(content, position.line + 1);
    let section = *open.last()?;
    let key = section
        .keys()
        .iter()
        .find(|k| k.eq_ignore_ascii_case(&word))?;
    Some(make_hover(format!(
        "**{}** -- field of `{}`: {}",
        key,
        section.name(),
        section.description()
    )))
}

fn tag_markdown(tag: Tag) -> String {
    let parent = match tag.legal_parent() {
        Some(parent) => format!("inside `{}`", parent.name()),
        None => "at top level".to_string(),
    };
    let mut markdown = format!("**{}** -- {}\n\nAllowed {}.", tag.name(), tag.description(), parent);
    if !tag.keys().is_empty() {
        markdown.push_str(&format!("\n\nKeys: {}", tag.keys().join(", ")));
    }
    markdown
}

/// Create a Hover with markdown content.
fn make_hover(markdown: String) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: markdown,
        }),
        range: None,
    }
}

/// The run of name characters (letters, digits, `-`, `_`) around `col`.
pub fn word_at(line: &str, col: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let is_word = |c: char| c.is_alphanumeric() || c == '-' || c == '_';
    let col = col.min(chars.len());
    let mut start = col;
    while start > 0 && is_word(chars[start - 1]) {
        start -= 1;
    }
    let mut end = col;
    while end < chars.len() && is_word(chars[end]) {
        end += 1;
    }
    (start < end).then(|| chars[start..end].iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(hover: Hover) -> String {
        match hover.contents {
            HoverContents::Markup(m) => m.value,
            _ => panic!("expected markup"),
        }
    }

    #[test]
    fn word_at_includes_dashes() {
        assert_eq!(word_at("<<input-output", 5).as_deref(), Some("input-output"));
        assert_eq!(word_at("  ", 1), None);
    }

    #[test]
    fn hover_on_open_tag_describes_it() {
        let hover = compute_hover(Position::new(0, 4), "<<complexity\ncomplexity>>").unwrap();
        let text = value(hover);
        assert!(text.contains("**complexity**"));
        assert!(text.contains("inside `blueprint`"));
        assert!(text.contains("Time, Space"));
    }

    #[test]
    fn hover_on_key_names_its_section() {
        let content = "<<induction\nBaseCase: trivial\ninduction>>";
        let text = value(compute_hover(Position::new(1, 2), content).unwrap());
        assert!(text.contains("field of `induction`"));
    }

    #[test]
    fn hover_on_plain_text_is_none() {
        assert!(compute_hover(Position::new(0, 2), "hello world").is_none());
    }
}
