// crates/dpf-eval/src/lib.rs

//! Evaluators for a two-party distributed point function: single-point,
//! contiguous-interval, full-domain, and arbitrary-sequence, each built on
//! top of a path or interval memoizer that governs how much of the tree
//! walk is reused between calls.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod eval;
mod interval;
mod path;
mod sequence;

pub use eval::{eval_full, eval_interval, eval_point, eval_point_once, eval_sequence};
pub use interval::{BasicIntervalMemoizer, FullTreeIntervalMemoizer, MIN_PIVOT};
pub use path::{common_prefix_len, LcpPathMemoizer, NonMemoizingPathMemoizer, PathMemoizer};
pub use sequence::{evaluate_recipe, evaluate_recipe_reversing, make_recipe, Recipe, Step};
