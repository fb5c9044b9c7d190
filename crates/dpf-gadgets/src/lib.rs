// crates/dpf-gadgets/src/lib.rs

//! Gadgets built on top of the core DPF primitives: currently the
//! prefix/segment-parity gadget for single-bit-output keys.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod prefix_parity;

pub use prefix_parity::{
    all_segment_parities_from_prefix_parities, ensure_valid_endpoints, prefix_parities, prefix_parity, segment_parities, segment_parities_no_wrap,
    specific_segment_parities_from_prefix_parities,
};
