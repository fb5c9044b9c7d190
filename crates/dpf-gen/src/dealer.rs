// crates/dpf-gen/src/dealer.rs

//! The dealer: `deal()` builds one correlated pair of keys for a point
//! function `f_{alpha,beta}` over a `domain_bits`-wide input domain, for `k`
//! outputs sharing one concrete [`Output`] type.
//!
//! Grounded on `original_source/include/dpf/dpf_key.hpp::detail::make_dpf_impl`:
//! the per-level correction-word loop below is a direct re-expression of that
//! function's GGM-tree construction, not a line-by-line port.

use anyhow::{ensure, Result};
use dpf_core::leaf::{self, LeafBlock};
use dpf_core::{Beaver, Block, Key, LeafLayer, Output, Prg, Tree};

use crate::root_sampler::RootSampler;

/// Whether the point's input is fixed at dealer time or deferred to an
/// online completion protocol.
pub enum AlphaSpec {
    Concrete(u64),
    /// Deferred: the dealer anchors the tree at the canonical point `0`;
    /// the real `alpha` is agreed on later via `dpf_wildcard::complete_input`,
    /// which folds `alpha - 0` into each key's `offset_share`.
    Wildcard,
}

/// Whether one output slot's value is fixed at dealer time or deferred.
pub enum OutputSpec<O: Output> {
    Concrete(O),
    Wildcard,
}

/// Build a correlated pair of keys for `f_{alpha, betas}` over a
/// `domain_bits`-wide domain.
///
/// `domain_bits` must exceed `lg_outputs_per_leaf::<O>()` (the tree needs at
/// least one interior level once leaf packing is accounted for); violating
/// this is a configuration error, not a panic.
pub fn deal<O, P, R>(
    domain_bits: u32,
    alpha: &AlphaSpec,
    betas: &[OutputSpec<O>],
    prg: &P,
    sampler: &mut R,
) -> Result<(Key<O>, Key<O>)>
where
    O: Output,
    P: Prg + ?Sized,
    R: RootSampler,
{
    let lg_opl = leaf::lg_outputs_per_leaf::<O>();
    ensure!(domain_bits > lg_opl, "domain_bits ({domain_bits}) must exceed lg_outputs_per_leaf ({lg_opl}) for output type");
    ensure!(!betas.is_empty(), "deal requires at least one output");

    let depth = (domain_bits - lg_opl) as usize;
    let alpha_full: u64 = match alpha {
        AlphaSpec::Concrete(a) => *a,
        AlphaSpec::Wildcard => 0,
    };
    let alpha_node = alpha_full >> lg_opl;

    // Step 3: sample two roots differing only in their low bit.
    let seed = sampler.sample_block();
    let mut parent0 = seed.clear_low_bit();
    let mut parent1 = sampler.sample_block().set_low_bit(1);

    let mut correction_words = Vec::with_capacity(depth);
    let mut correction_advice = Vec::with_capacity(depth);

    for level in 0..depth {
        let bit = ((alpha_node >> (depth - 1 - level)) & 1) as u8;

        let (advice0, p0clean) = parent0.get_low_bit_and_clear_low_2bits();
        let (advice1, p1clean) = parent1.get_low_bit_and_clear_low_2bits();

        let (child0_l, child0_r) = prg.eval01(p0clean);
        let (child1_l, child1_r) = prg.eval01(p1clean);

        let child_l = child0_l ^ child1_l;
        let child_r = child0_r ^ child1_r;

        let t_l = child_l.get_low_bit() ^ u8::from(bit == 0);
        let t_r = child_r.get_low_bit() ^ u8::from(bit == 1);

        let (child_not_bit, t_bit) = if bit == 0 { (child_r, t_l) } else { (child_l, t_r) };
        let cw = child_not_bit.set_low_bit(t_bit);

        let child0_bit = if bit == 0 { child0_l } else { child0_r };
        let child1_bit = if bit == 0 { child1_l } else { child1_r };
        parent0 = child0_bit.xor_if(cw, advice0 != 0);
        parent1 = child1_bit.xor_if(cw, advice1 != 0);

        correction_words.push(child_not_bit.clear_low_2bits());
        correction_advice.push((t_r << 1) | t_l);
    }

    let sign0 = parent0.get_low_bit();
    let seed0 = parent0.clear_low_2bits();
    let seed1 = parent1.clear_low_2bits();

    let tree = Tree { root: seed, correction_words, correction_advice };

    let mut leaves0 = Vec::with_capacity(betas.len());
    let mut leaves1 = Vec::with_capacity(betas.len());

    for beta in betas {
        match beta {
            OutputSpec::Concrete(y) => {
                let cw = leaf::make_leaf::<O, P>(prg, alpha_full, seed0, seed1, sign0, *y);
                leaves0.push(LeafLayer::concrete(cw.clone()));
                leaves1.push(LeafLayer::concrete(cw));
            }
            OutputSpec::Wildcard => {
                let (layer0, layer1) = deal_wildcard_output::<O, P>(prg, alpha_full, seed0, seed1, sign0, sampler);
                leaves0.push(layer0);
                leaves1.push(layer1);
            }
        }
    }

    let input_is_wildcard = matches!(alpha, AlphaSpec::Wildcard);
    let key0 = Key::new(0, Tree { root: tree.root, correction_words: tree.correction_words.clone(), correction_advice: tree.correction_advice.clone() }, leaves0, input_is_wildcard, 0);
    let key1 = Key::new(1, tree, leaves1, input_is_wildcard, 0);
    Ok((key0, key1))
}

/// Builds one wildcard output slot's pair of leaf layers.
///
/// The dealer additively splits `mask = make_leaf_mask(seed0, seed1)` (the
/// same structural mask a concrete output's correction word would combine
/// with `beta`) between the two parties, and hands each a `Beaver` carrying
/// the public sign factor (`output_blind`) and this party's mask share
/// (`vector_blind`). `blinded_vector` is reserved for a future interactive
/// blinding round and is currently all-zero.
fn deal_wildcard_output<O, P>(
    prg: &P,
    alpha_full: u64,
    seed0: Block,
    seed1: Block,
    sign0: u8,
    sampler: &mut impl RootSampler,
) -> (LeafLayer<O>, LeafLayer<O>)
where
    O: Output,
    P: Prg + ?Sized,
{
    let mask = leaf::make_leaf_mask::<O, P>(prg, seed0, seed1);
    let sign_factor = if sign0 != 0 { O::ONE } else { O::ZERO.sub(O::ONE) };

    let mut share0 = Vec::with_capacity(mask.0.len());
    let mut share1 = Vec::with_capacity(mask.0.len());
    for term in mask.0.iter().map(|m| if sign0 != 0 { O::ZERO.sub(*m) } else { *m }) {
        let r0 = random_output::<O>(sampler);
        share0.push(r0);
        share1.push(term.sub(r0));
    }

    let opl = leaf::outputs_per_leaf::<O>();
    let beaver0 = Beaver { output_blind: sign_factor, vector_blind: share0.clone(), blinded_vector: vec![O::ZERO; opl] };
    let beaver1 = Beaver { output_blind: sign_factor, vector_blind: share1.clone(), blinded_vector: vec![O::ZERO; opl] };

    let _ = alpha_full;
    (
        LeafLayer::wildcard(LeafBlock(share0), beaver0),
        LeafLayer::wildcard(LeafBlock(share1), beaver1),
    )
}

/// A uniformly-sampled `O` value, drawn byte-wise from the root sampler so
/// that the dealer needs only one source of randomness.
fn random_output<O: Output>(sampler: &mut impl RootSampler) -> O {
    let block = sampler.sample_block();
    let bytes = block.to_le_bytes();
    O::from_le_bytes(&bytes)
}
