// crates/dpf-wildcard/src/input.rs

//! Online completion of a wildcard *input* (spec §4.4 step 2 / §4.6 input
//! completion). See `DESIGN.md` decision 7: the dealer anchors a wildcard
//! input's tree at the canonical point `0`; completion agrees on the real
//! `alpha` entirely between the two parties and folds it into
//! `key.offset_share`, which the evaluator-side offset wrapper then adds to
//! every input before walking the tree.

use anyhow::Result;
use dpf_core::{DpfError, Key, Output, WildcardState};

/// Completes the input wildcard given each party's own additive share of
/// the agreed-upon `alpha` (over `0..domain_size`). Both parties call this
/// with their own `(own_alpha_share, peer_alpha_share)` pair (after
/// exchanging shares out of band) and end up with the same `offset_share`.
pub fn complete_input<O: Output>(key: &mut Key<O>, own_alpha_share: u64, peer_alpha_share: u64, domain_size: u64) -> Result<()> {
    key.input_wildcard.begin_completion(usize::MAX).map_err(to_anyhow)?;
    key.input_wildcard.advance(usize::MAX, WildcardState::Waiting).map_err(to_anyhow)?;
    key.input_wildcard.finish(usize::MAX, WildcardState::Waiting).map_err(to_anyhow)?;

    let alpha = own_alpha_share.wrapping_add(peer_alpha_share) % domain_size;
    key.offset_share = (domain_size - alpha % domain_size) % domain_size;
    Ok(())
}

/// `x' = x + alpha_offset (mod domain_size)`: the offset wrapper applied by
/// every evaluator ahead of a tree walk. Identity when the input was never a
/// wildcard (`offset_share == 0`).
#[must_use]
pub fn apply_offset<O: Output>(key: &Key<O>, x: u64, domain_size: u64) -> u64 {
    (x + key.offset_share) % domain_size
}

fn to_anyhow(e: DpfError) -> anyhow::Error {
    anyhow::Error::new(e)
}
