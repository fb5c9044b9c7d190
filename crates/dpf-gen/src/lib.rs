// crates/dpf-gen/src/lib.rs

//! The dealer half of a two-party distributed point function: given
//! `(alpha, beta_1..beta_k)` (either value may be a deferred wildcard),
//! builds one correlated pair of `dpf_core::Key` objects.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod dealer;
mod root_sampler;

pub use dealer::{deal, AlphaSpec, OutputSpec};
pub use root_sampler::{RngRootSampler, RootSampler};
