// crates/dpf-core/src/lib.rs

//! Output-type-generic core of a two-party Distributed Point Function:
//! the 128-bit block twiddle primitives, leaf packing, the key object, the
//! `Prg` contract, the wildcard state machine, and key (de)serialization.
//!
//! Dealer and evaluator logic live in `dpf-gen` and `dpf-eval`; this crate
//! only fixes the shared data model and its invariants.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod block;
pub mod digest;
pub mod error;
pub mod io;
pub mod key;
pub mod leaf;
pub mod output;
pub mod prg;
pub mod tree;
pub mod wildcard;

pub use block::Block;
pub use error::{DpfError, Result};
pub use key::{Beaver, Key, LeafLayer};
pub use output::{Bit, Output, XorWrapper};
pub use prg::Prg;
pub use tree::Tree;
pub use wildcard::{WildcardCell, WildcardState};
