// crates/dpf-wildcard/src/lib.rs

//! Online completion of deferred wildcard inputs and outputs (spec §4.6),
//! built on `dpf_core::wildcard::WildcardCell`'s CAS-guarded state machine.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod input;
mod output;

pub use input::{apply_offset, complete_input};
pub use output::{begin_output_completion, finish_output_completion};
