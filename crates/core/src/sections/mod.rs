//! One parser per section kind.
//!
//! Every parser receives exactly the lines between its open and close tags
//! and a diagnostic sink, and returns the finished node. Parsers never look
//! at sibling sections; cross-section checks (step references, spec gating)
//! live in the builder.

mod blueprint;
mod fields;
mod header;
mod proof;
pub mod references;
mod steps;
mod text;

pub use blueprint::{parse_complexity, parse_functional_correctness, parse_input_output};
pub use header::parse_header;
pub use proof::{parse_induction, parse_invariant};
pub use references::{check_step_mentions, collect_step_mentions, StepMention};
pub use steps::parse_operational_steps;
pub use text::{parse_ocaml_code, parse_text_answer};
