//! Tag vocabulary and line classification.
//!
//! An open token is a line starting with `<<name`, optionally followed by
//! metadata. A close token is a line that is exactly `name>>`. Tag names are
//! case-insensitive. Anything else is text belonging to the enclosing
//! section.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Every section kind the grammar knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    Header,
    Problem,
    Blueprint,
    FunctionalCorrectness,
    InputOutput,
    Complexity,
    OperationalSteps,
    OcamlCode,
    Proof,
    Induction,
    Invariant,
    TextAnswer,
}

impl Tag {
    pub const ALL: [Tag; 12] = [
        Tag::Header,
        Tag::Problem,
        Tag::Blueprint,
        Tag::FunctionalCorrectness,
        Tag::InputOutput,
        Tag::Complexity,
        Tag::OperationalSteps,
        Tag::OcamlCode,
        Tag::Proof,
        Tag::Induction,
        Tag::Invariant,
        Tag::TextAnswer,
    ];

    /// Canonical lowercase name as written in source.
    pub fn name(self) -> &'static str {
        match self {
            Tag::Header => "header",
            Tag::Problem => "problem",
            Tag::Blueprint => "blueprint",
            Tag::FunctionalCorrectness => "functional-correctness",
            Tag::InputOutput => "input-output",
            Tag::Complexity => "complexity",
            Tag::OperationalSteps => "operational-steps",
            Tag::OcamlCode => "ocaml-code",
            Tag::Proof => "proof",
            Tag::Induction => "induction",
            Tag::Invariant => "invariant",
            Tag::TextAnswer => "text-answer",
        }
    }

    pub fn from_name(name: &str) -> Option<Tag> {
        Tag::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// The tag this one must be directly inside; `None` means top level.
    pub fn legal_parent(self) -> Option<Tag> {
        match self {
            Tag::Header | Tag::Problem => None,
            Tag::Blueprint
            | Tag::OperationalSteps
            | Tag::OcamlCode
            | Tag::Proof
            | Tag::TextAnswer => Some(Tag::Problem),
            Tag::FunctionalCorrectness | Tag::InputOutput | Tag::Complexity => {
                Some(Tag::Blueprint)
            }
            Tag::Induction | Tag::Invariant => Some(Tag::Proof),
        }
    }

    pub fn is_legal_in(self, parent: Option<Tag>) -> bool {
        self.legal_parent() == parent
    }

    /// Tags that may be opened directly inside `parent` (`None` = top level).
    pub fn legal_children(parent: Option<Tag>) -> impl Iterator<Item = Tag> {
        Tag::ALL
            .into_iter()
            .filter(move |t| t.legal_parent() == parent)
    }

    /// Containers hold other sections; leaves hold lines of content.
    pub fn is_container(self) -> bool {
        matches!(self, Tag::Problem | Tag::Blueprint | Tag::Proof)
    }

    /// `proof` and `text-answer` may appear several times in one problem.
    pub fn is_repeatable(self) -> bool {
        matches!(self, Tag::Proof | Tag::TextAnswer)
    }

    /// Field keys recognised inside the section, for editor completion.
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            Tag::Header => &["Name", "Assignment", "Collaborators", "Date", "Professor"],
            Tag::FunctionalCorrectness => &["Requires", "Ensures"],
            Tag::InputOutput => &["Input", "Output"],
            Tag::Complexity => &["Time", "Space"],
            Tag::OperationalSteps => &["Step"],
            Tag::Induction => &["BaseCase", "InductiveHypothesis", "InductiveStep"],
            Tag::Invariant => &["Initialisation", "Maintenance", "Termination"],
            _ => &[],
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tag::Header => "document metadata: Name, Assignment, Collaborators, Date, Professor",
            Tag::Problem => "one exercise, opened as `<<problem N: title`",
            Tag::Blueprint => "the problem's formal contract",
            Tag::FunctionalCorrectness => "pre/post condition pair: Requires and Ensures",
            Tag::InputOutput => "worked examples as alternating Input and Output entries",
            Tag::Complexity => "cost bounds: Time (required) and Space",
            Tag::OperationalSteps => "ordered algorithm narrative, one `step:` per entry",
            Tag::OcamlCode => "OCaml source, checked by the external verifier",
            Tag::Proof => "one proof, opened as `<<proof [helper]: title`",
            Tag::Induction => "BaseCase, InductiveHypothesis, InductiveStep, in that order",
            Tag::Invariant => "Initialisation, Maintenance, Termination, in that order",
            Tag::TextAnswer => "free-text answer, opened as `<<text-answer title`",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recognised `<<name metadata` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTag<'a> {
    pub tag: Tag,
    /// Byte range of the name within the trimmed line.
    pub name_range: Range<usize>,
    pub metadata: &'a str,
}

/// A recognised `name>>` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseTag {
    pub tag: Tag,
    pub name_range: Range<usize>,
}

/// A line that looks like a tag but is not a valid one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTag {
    pub range: Range<usize>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken<'a> {
    Open(OpenTag<'a>),
    Close(CloseTag),
    Malformed(MalformedTag),
    Text,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Classify one trimmed line.
///
/// `name>>` with an unknown name is reported only when it is the whole
/// line; `x>>1 halves x` stays body text.
pub fn classify(text: &str) -> LineToken<'_> {
    if let Some(rest) = text.strip_prefix("<<") {
        return classify_open(text, rest);
    }
    if let Some(end) = text.find(">>") {
        let head = &text[..end];
        if !head.is_empty() && head.chars().all(is_name_char) {
            let name_range = 0..end;
            return match Tag::from_name(head) {
                Some(tag) if end + 2 == text.len() => LineToken::Close(CloseTag { tag, name_range }),
                Some(tag) => LineToken::Malformed(MalformedTag {
                    range: 0..text.len(),
                    message: format!("unexpected text after '{}>>'", tag),
                }),
                None if end + 2 == text.len() => LineToken::Malformed(MalformedTag {
                    range: name_range,
                    message: format!("unknown tag '{}'", head),
                }),
                None => LineToken::Text,
            };
        }
    }
    LineToken::Text
}

fn classify_open<'a>(text: &'a str, rest: &'a str) -> LineToken<'a> {
    let name_len = rest
        .char_indices()
        .find(|(_, c)| !is_name_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let name = &rest[..name_len];
    let name_range = 2..2 + name_len;
    if name.is_empty() {
        return LineToken::Malformed(MalformedTag {
            range: 0..text.len(),
            message: "expected a tag name after '<<'".to_string(),
        });
    }
    let Some(tag) = Tag::from_name(name) else {
        return LineToken::Malformed(MalformedTag {
            range: name_range,
            message: format!("unknown tag '{}'", name),
        });
    };
    let metadata = rest[name_len..].trim_start();
    let metadata = metadata.strip_prefix(':').unwrap_or(metadata).trim();
    LineToken::Open(OpenTag {
        tag,
        name_range,
        metadata,
    })
}

/// Metadata of `<<problem N: title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemMeta<'a> {
    pub number: &'a str,
    pub title: &'a str,
}

/// Split problem metadata into number and title. The number is the leading
/// token up to whitespace or `:`. `None` if there is no number.
pub fn problem_meta(metadata: &str) -> Option<ProblemMeta<'_>> {
    let trimmed = metadata.trim();
    let number_end = trimmed
        .find(|c: char| c.is_whitespace() || c == ':')
        .unwrap_or(trimmed.len());
    let number = &trimmed[..number_end];
    if number.is_empty() {
        return None;
    }
    let title = trimmed[number_end..].trim_start();
    let title = title.strip_prefix(':').unwrap_or(title).trim();
    Some(ProblemMeta { number, title })
}

/// Split proof metadata into the helper flag and the title.
pub fn proof_meta(metadata: &str) -> (bool, &str) {
    let trimmed = metadata.trim();
    let word_end = trimmed
        .find(|c: char| c.is_whitespace() || c == ':')
        .unwrap_or(trimmed.len());
    if trimmed[..word_end].eq_ignore_ascii_case("helper") {
        let rest = trimmed[word_end..].trim_start();
        let rest = rest.strip_prefix(':').unwrap_or(rest).trim();
        (true, rest)
    } else {
        (false, trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_round_trips_through_its_name() {
        for tag in Tag::ALL {
            assert_eq!(Tag::from_name(tag.name()), Some(tag));
            assert_eq!(Tag::from_name(&tag.name().to_uppercase()), Some(tag));
        }
    }

    #[test]
    fn open_with_problem_metadata() {
        let LineToken::Open(open) = classify("<<problem 1: Sum") else {
            panic!("expected open tag");
        };
        assert_eq!(open.tag, Tag::Problem);
        assert_eq!(open.name_range, 2..9);
        assert_eq!(open.metadata, "1: Sum");
        let meta = problem_meta(open.metadata).unwrap();
        assert_eq!(meta.number, "1");
        assert_eq!(meta.title, "Sum");
    }

    #[test]
    fn open_accepts_colon_before_metadata() {
        let LineToken::Open(open) = classify("<<Text-Answer: Why?") else {
            panic!("expected open tag");
        };
        assert_eq!(open.tag, Tag::TextAnswer);
        assert_eq!(open.metadata, "Why?");
    }

    #[test]
    fn close_must_be_exact() {
        assert_eq!(
            classify("Blueprint>>"),
            LineToken::Close(CloseTag {
                tag: Tag::Blueprint,
                name_range: 0..9,
            })
        );
        assert!(matches!(classify("blueprint>> trailing"), LineToken::Malformed(_)));
    }

    #[test]
    fn unknown_names_are_malformed() {
        let LineToken::Malformed(m) = classify("<<lemma") else {
            panic!("expected malformed");
        };
        assert_eq!(m.range, 2..7);
        assert!(m.message.contains("lemma"));
        assert!(matches!(classify("lemma>>"), LineToken::Malformed(_)));
        assert!(matches!(classify("<<"), LineToken::Malformed(_)));
    }

    #[test]
    fn unknown_name_before_arrows_mid_line_is_text() {
        assert_eq!(classify("x>>1 halves x"), LineToken::Text);
        assert_eq!(classify("n>>k"), LineToken::Text);
        let LineToken::Malformed(m) = classify("x>>") else {
            panic!("expected malformed");
        };
        assert_eq!(m.range, 0..1);
        assert!(matches!(classify("problem>> extra"), LineToken::Malformed(_)));
    }

    #[test]
    fn ordinary_text_is_not_a_tag() {
        assert_eq!(classify("x >> y"), LineToken::Text);
        assert_eq!(classify("Requires: a << b"), LineToken::Text);
        assert_eq!(classify(""), LineToken::Text);
    }

    #[test]
    fn nesting_table() {
        assert!(Tag::Problem.is_legal_in(None));
        assert!(!Tag::Problem.is_legal_in(Some(Tag::Problem)));
        assert!(Tag::Complexity.is_legal_in(Some(Tag::Blueprint)));
        assert!(!Tag::Complexity.is_legal_in(Some(Tag::Problem)));
        assert!(Tag::Invariant.is_legal_in(Some(Tag::Proof)));
        let children: Vec<_> = Tag::legal_children(Some(Tag::Proof)).collect();
        assert_eq!(children, vec![Tag::Induction, Tag::Invariant]);
    }

    #[test]
    fn problem_without_number_has_no_meta() {
        assert!(problem_meta("").is_none());
        assert!(problem_meta(": Title only").is_none());
        assert_eq!(problem_meta("3").unwrap().title, "");
    }

    #[test]
    fn problem_number_is_the_leading_token() {
        let meta = problem_meta("1 Sum").unwrap();
        assert_eq!(meta.number, "1");
        assert_eq!(meta.title, "Sum");
        let meta = problem_meta("2b :  Two Sum ").unwrap();
        assert_eq!(meta.number, "2b");
        assert_eq!(meta.title, "Two Sum");
        assert_eq!(problem_meta("1:Sum").unwrap().number, "1");
    }

    #[test]
    fn proof_helper_flag() {
        assert_eq!(proof_meta("helper: Lemma A"), (true, "Lemma A"));
        assert_eq!(proof_meta("Helper Lemma A"), (true, "Lemma A"));
        assert_eq!(proof_meta("Main theorem"), (false, "Main theorem"));
        assert_eq!(proof_meta("helpers are nice"), (false, "helpers are nice"));
    }
}
