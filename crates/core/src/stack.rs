//! Stack of currently open sections.
//!
//! Closing `name>>` pops the nearest frame with that name. Frames above it
//! are popped in the same operation and handed back as orphans so the caller
//! can report each one as unclosed.

use crate::error::Span;
use crate::grammar::Tag;

/// One open section.
#[derive(Debug)]
pub struct Frame<N> {
    pub tag: Tag,
    /// Line of the `<<name` token.
    pub line: u32,
    /// Span of the tag name on that line.
    pub name_span: Span,
    /// Rejected at open time; its content is still checked but never
    /// attached to the document.
    pub discarded: bool,
    pub node: N,
}

/// Result of a successful close.
#[derive(Debug)]
pub struct Closed<N> {
    pub frame: Frame<N>,
    /// Frames that were still open above the closed one, innermost first.
    pub orphans: Vec<Frame<N>>,
}

#[derive(Debug)]
pub struct SectionStack<N> {
    frames: Vec<Frame<N>>,
}

impl<N> Default for SectionStack<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> SectionStack<N> {
    pub fn new() -> Self {
        SectionStack { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: Frame<N>) {
        self.frames.push(frame);
    }

    pub fn top(&self) -> Option<&Frame<N>> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Frame<N>> {
        self.frames.last_mut()
    }

    pub fn top_tag(&self) -> Option<Tag> {
        self.top().map(|f| f.tag)
    }

    /// Whether a new child of the current top would be discarded.
    pub fn in_discarded(&self) -> bool {
        self.top().is_some_and(|f| f.discarded)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Open frames from the outermost to the innermost.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Frame<N>> {
        self.frames.iter()
    }

    /// Innermost open frame with the given tag.
    pub fn nearest_mut(&mut self, tag: Tag) -> Option<&mut Frame<N>> {
        self.frames.iter_mut().rev().find(|f| f.tag == tag)
    }

    /// Close the nearest open frame named `tag`, splicing off everything
    /// above it. `None` when no such frame is open.
    pub fn close(&mut self, tag: Tag) -> Option<Closed<N>> {
        let idx = self.frames.iter().rposition(|f| f.tag == tag)?;
        let mut orphans = self.frames.split_off(idx + 1);
        orphans.reverse();
        let frame = self.frames.pop()?;
        Some(Closed { frame, orphans })
    }

    /// Pop every open frame, innermost first.
    pub fn drain(&mut self) -> Vec<Frame<N>> {
        let mut frames = std::mem::take(&mut self.frames);
        frames.reverse();
        frames
    }
}
