// crates/dpf-wildcard/src/output.rs

//! Online completion of a wildcard *output* slot (spec §4.6, branch A/B).
//!
//! Each party holds its own additive share of the real `beta` for this slot
//! plus a dealer-distributed share of the structural leaf mask (see
//! `DESIGN.md` decision 6). Completion is two local steps around one
//! message exchange: `begin` folds the local beta-share in and returns the
//! resulting leaf share to send to the peer; `finish` consumes the peer's
//! leaf share and publishes the combined leaf.

use anyhow::{anyhow, Result};
use dpf_core::{DpfError, Key, Output, WildcardState};

/// Starts completion of output `slot`: combines this party's own `beta`
/// share with its mask share and the public sign factor, and returns the
/// resulting leaf share to send to the peer. CAS-guards against a second
/// completion attempt on the same slot.
pub fn begin_output_completion<O: Output>(key: &Key<O>, slot: usize, offset: usize, own_beta_share: O) -> Result<Vec<O>> {
    key.leaves[slot].wildcard.begin_completion(slot).map_err(to_anyhow)?;

    let beaver = key.leaves[slot]
        .beaver
        .as_ref()
        .ok_or_else(|| anyhow!("wildcard output slot {slot} has no beaver material"))?;

    let mut leaf_share = beaver.vector_blind.clone();
    leaf_share[offset] = leaf_share[offset].add(beaver.output_blind.mul(own_beta_share));

    let to = if leaf_share.len() > 1 { WildcardState::Blinded } else { WildcardState::Waiting };
    key.leaves[slot].wildcard.advance(slot, to).map_err(to_anyhow)?;
    Ok(leaf_share)
}

/// Finishes completion of output `slot` given the peer's leaf share,
/// publishing the combined leaf and marking the slot ready.
pub fn finish_output_completion<O: Output>(key: &mut Key<O>, slot: usize, own_leaf_share: Vec<O>, peer_leaf_share: &[O]) -> Result<()> {
    let from = if own_leaf_share.len() > 1 { WildcardState::Blinded } else { WildcardState::Waiting };
    key.leaves[slot].wildcard.finish(slot, from).map_err(to_anyhow)?;

    let combined = own_leaf_share
        .into_iter()
        .zip(peer_leaf_share.iter())
        .map(|(a, b)| a.add(*b))
        .collect();
    key.leaves[slot].leaf = dpf_core::leaf::LeafBlock(combined);
    Ok(())
}

fn to_anyhow(e: DpfError) -> anyhow::Error {
    anyhow::Error::new(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpf_core::leaf;
    use dpf_gen::{deal, AlphaSpec, OutputSpec};
    use dpf_prg::Aes128Prg;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sampler(seed: u64) -> dpf_gen::RngRootSampler<StdRng> {
        dpf_gen::RngRootSampler::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn completion_reconstructs_agreed_beta_at_alpha() {
        let prg = Aes128Prg::new();
        let mut rng = sampler(11);
        let alpha = 12u64;
        let (mut key0, mut key1) = deal::<u32, _, _>(8, &AlphaSpec::Concrete(alpha), &[OutputSpec::<u32>::Wildcard], &prg, &mut rng).unwrap();

        let offset = leaf::offset_within_block::<u32>(alpha);
        let beta = 5u32;
        let (beta0, beta1) = (3u32, beta.wrapping_sub(3));

        let share0 = begin_output_completion(&key0, 0, offset, beta0).unwrap();
        let share1 = begin_output_completion(&key1, 0, offset, beta1).unwrap();
        finish_output_completion(&mut key0, 0, share0.clone(), &share1).unwrap();
        finish_output_completion(&mut key1, 0, share1, &share0).unwrap();

        assert!(key0.ensure_ready(0).is_ok());
        assert!(key1.ensure_ready(0).is_ok());

        let node0 = key0.tree.walk(&prg, alpha >> leaf::lg_outputs_per_leaf::<u32>());
        let node1 = key1.tree.walk(&prg, alpha >> leaf::lg_outputs_per_leaf::<u32>());
        let leaf0 = key0.leaves[0].traverse_exterior(&prg, node0);
        let leaf1 = key1.leaves[0].traverse_exterior(&prg, node1);
        let y0 = leaf::extract_leaf(&leaf0, alpha);
        let y1 = leaf::extract_leaf(&leaf1, alpha);
        assert_eq!(y0.add(y1), beta);

        let other_x = alpha + 1;
        let leaf0 = key0.leaves[0].traverse_exterior(&prg, key0.tree.walk(&prg, other_x >> leaf::lg_outputs_per_leaf::<u32>()));
        let leaf1 = key1.leaves[0].traverse_exterior(&prg, key1.tree.walk(&prg, other_x >> leaf::lg_outputs_per_leaf::<u32>()));
        let y0 = leaf::extract_leaf(&leaf0, other_x);
        let y1 = leaf::extract_leaf(&leaf1, other_x);
        assert_eq!(y0.add(y1), 0u32);
    }

    #[test]
    fn second_completion_attempt_is_rejected() {
        let prg = Aes128Prg::new();
        let mut rng = sampler(12);
        let (key0, _key1) = deal::<u32, _, _>(8, &AlphaSpec::Concrete(1), &[OutputSpec::<u32>::Wildcard], &prg, &mut rng).unwrap();
        let _ = begin_output_completion(&key0, 0, 0, 1u32).unwrap();
        assert!(begin_output_completion(&key0, 0, 0, 1u32).is_err());
    }

    #[test]
    fn replayed_finish_is_rejected_not_silently_reapplied() {
        let prg = Aes128Prg::new();
        let mut rng = sampler(13);
        let alpha = 7u64;
        let (mut key0, key1) = deal::<u32, _, _>(8, &AlphaSpec::Concrete(alpha), &[OutputSpec::<u32>::Wildcard], &prg, &mut rng).unwrap();

        let offset = leaf::offset_within_block::<u32>(alpha);
        let share0 = begin_output_completion(&key0, 0, offset, 3u32).unwrap();
        let share1 = begin_output_completion(&key1, 0, offset, 2u32).unwrap();
        finish_output_completion(&mut key0, 0, share0.clone(), &share1).unwrap();

        // A replayed/duplicate finish call must be rejected, not silently
        // accepted and allowed to overwrite the already-published leaf.
        assert!(finish_output_completion(&mut key0, 0, share0, &share1).is_err());
    }
}
