// crates/dpf-eval/src/eval.rs

//! The four top-level evaluators: point, interval, full-domain, sequence.
//! Each refuses to run against an outstanding wildcard (`Key::ensure_ready`)
//! and applies the input offset wrapper (`dpf_wildcard::apply_offset`)
//! before any tree walk, so a completed wildcard input is transparent to
//! every evaluator.

use dpf_core::{leaf, Output, Prg, Result};

use crate::interval::{BasicIntervalMemoizer, FullTreeIntervalMemoizer, MIN_PIVOT};
use crate::path::{LcpPathMemoizer, NonMemoizingPathMemoizer, PathMemoizer};
use crate::sequence::{evaluate_recipe, make_recipe};

/// A single point, reusing LCP state across repeated calls on the same
/// memoizer (pass a fresh [`NonMemoizingPathMemoizer`] for one-shot calls).
pub fn eval_point<O, P, M>(key: &dpf_core::Key<O>, slot: usize, x: u64, domain_size: u64, memo: &mut M, prg: &P) -> Result<O>
where
    O: Output,
    P: Prg + ?Sized,
    M: PathMemoizer<P>,
{
    key.ensure_ready(slot)?;
    let xp = dpf_wildcard::apply_offset(key, x, domain_size);
    let lg_opl = leaf::lg_outputs_per_leaf::<O>();
    let node = memo.node_at(&key.tree, prg, xp >> lg_opl);
    let leaf = key.leaves[slot].traverse_exterior(prg, node);
    Ok(leaf::extract_leaf(&leaf, xp))
}

/// A single point with no path-memoizer state to carry between calls.
pub fn eval_point_once<O, P>(key: &dpf_core::Key<O>, slot: usize, x: u64, domain_size: u64, prg: &P) -> Result<O>
where
    O: Output,
    P: Prg + ?Sized,
{
    let mut memo = NonMemoizingPathMemoizer;
    eval_point(key, slot, x, domain_size, &mut memo, prg)
}

/// All outputs for `x` in `[lo, hi)`, in ascending `x` order.
///
/// When the input was completed as a wildcard and the offset rotation would
/// wrap `[lo, hi)` across the domain boundary, falls back to one
/// `eval_point` call per position (documented simplification: the pruning
/// node-range algorithm assumes a contiguous node range, which a wraparound
/// breaks into two).
pub fn eval_interval<O, P>(key: &dpf_core::Key<O>, slot: usize, lo: u64, hi: u64, domain_size: u64, prg: &P) -> Result<Vec<O>>
where
    O: Output,
    P: Prg + ?Sized,
{
    key.ensure_ready(slot)?;
    if hi <= lo {
        return Ok(Vec::new());
    }
    let xp_lo = dpf_wildcard::apply_offset(key, lo, domain_size);
    let xp_hi = dpf_wildcard::apply_offset(key, hi, domain_size);
    if key.offset_share == 0 || xp_lo < xp_hi || (xp_hi == 0 && xp_lo < domain_size) {
        let hi_bound = if xp_hi == 0 { domain_size } else { xp_hi };
        eval_interval_nodes(key, slot, xp_lo, hi_bound, prg)
    } else {
        let mut memo = NonMemoizingPathMemoizer;
        (lo..hi).map(|x| eval_point(key, slot, x, domain_size, &mut memo, prg)).collect()
    }
}

fn eval_interval_nodes<O, P>(key: &dpf_core::Key<O>, slot: usize, lo: u64, hi: u64, prg: &P) -> Result<Vec<O>>
where
    O: Output,
    P: Prg + ?Sized,
{
    let lg_opl = leaf::lg_outputs_per_leaf::<O>();
    let opl = leaf::outputs_per_leaf::<O>() as u64;
    let lo_node = lo >> lg_opl;
    let hi_node = if hi == 0 { 0 } else { ((hi - 1) >> lg_opl) + 1 };

    let pivot_hint = MIN_PIVOT.max(((hi_node - lo_node) as usize).next_power_of_two() / 2);
    let mut memo = BasicIntervalMemoizer::new(pivot_hint).expect("pivot_hint is always at least MIN_PIVOT");
    let nodes = memo.leaves_in_range(&key.tree, prg, lo_node, hi_node);

    let mut out = Vec::with_capacity((hi - lo) as usize);
    for &(node_idx, node) in nodes {
        let leaf = key.leaves[slot].traverse_exterior(prg, node);
        let block_start = node_idx * opl;
        for (i, val) in leaf.0.into_iter().enumerate() {
            let x = block_start + i as u64;
            if x >= lo && x < hi {
                out.push(val);
            }
        }
    }
    Ok(out)
}

/// Every output over the whole domain, in ascending `x` order. A
/// specialization of interval evaluation where pruning never applies (every
/// leaf is wanted), so the full-tree memoizer is used instead.
pub fn eval_full<O, P>(key: &dpf_core::Key<O>, slot: usize, domain_size: u64, prg: &P) -> Result<Vec<O>>
where
    O: Output,
    P: Prg + ?Sized,
{
    key.ensure_ready(slot)?;
    let mut memo = FullTreeIntervalMemoizer::new();
    let nodes = memo.expand_full(&key.tree, prg);

    let mut out = Vec::with_capacity(domain_size as usize);
    for &node in nodes {
        let leaf = key.leaves[slot].traverse_exterior(prg, node);
        out.extend(leaf.0);
    }
    out.truncate(domain_size as usize);
    if key.offset_share != 0 {
        out.rotate_left((key.offset_share % domain_size) as usize);
    }
    Ok(out)
}

/// Outputs for an arbitrary (not necessarily contiguous or sorted) list of
/// inputs, in the same order as `xs`.
pub fn eval_sequence<O, P>(key: &dpf_core::Key<O>, slot: usize, xs: &[u64], domain_size: u64, prg: &P) -> Result<Vec<O>>
where
    O: Output,
    P: Prg + ?Sized,
{
    key.ensure_ready(slot)?;
    let lg_opl = leaf::lg_outputs_per_leaf::<O>();
    let xps: Vec<u64> = xs.iter().map(|&x| dpf_wildcard::apply_offset(key, x, domain_size)).collect();
    let node_indices: Vec<u64> = xps.iter().map(|&xp| xp >> lg_opl).collect();
    let recipe = make_recipe(&node_indices, key.tree.depth());
    let nodes = evaluate_recipe(&recipe, &key.tree, prg);

    let mut out = Vec::with_capacity(xs.len());
    for (j, &xp) in xps.iter().enumerate() {
        let leaf = key.leaves[slot].traverse_exterior(prg, nodes[j]);
        out.push(leaf::extract_leaf(&leaf, xp));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpf_gen::{deal, AlphaSpec, OutputSpec};
    use dpf_prg::Aes128Prg;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sampler(seed: u64) -> dpf_gen::RngRootSampler<StdRng> {
        dpf_gen::RngRootSampler::new(StdRng::seed_from_u64(seed))
    }

    fn combine<O: Output>(a: O, b: O) -> O {
        a.add(b)
    }

    #[test]
    fn point_eval_matches_point_function_everywhere() {
        let prg = Aes128Prg::new();
        let mut rng = sampler(21);
        let domain_bits = 8u32;
        let domain_size = 1u64 << domain_bits;
        let (key0, key1) = deal::<u32, _, _>(domain_bits, &AlphaSpec::Concrete(77), &[OutputSpec::Concrete(13u32)], &prg, &mut rng).unwrap();
        let mut m0 = LcpPathMemoizer::new();
        let mut m1 = LcpPathMemoizer::new();
        for x in 0..domain_size {
            let y0 = eval_point(&key0, 0, x, domain_size, &mut m0, &prg).unwrap();
            let y1 = eval_point(&key1, 0, x, domain_size, &mut m1, &prg).unwrap();
            let want = if x == 77 { 13u32 } else { 0 };
            assert_eq!(combine(y0, y1), want);
        }
    }

    #[test]
    fn interval_eval_matches_point_eval_over_a_subrange() {
        let prg = Aes128Prg::new();
        let mut rng = sampler(22);
        let domain_bits = 9u32;
        let domain_size = 1u64 << domain_bits;
        let (key0, key1) = deal::<u16, _, _>(domain_bits, &AlphaSpec::Concrete(300), &[OutputSpec::Concrete(9u16)], &prg, &mut rng).unwrap();
        let out0 = eval_interval(&key0, 0, 250, 400, domain_size, &prg).unwrap();
        let out1 = eval_interval(&key1, 0, 250, 400, domain_size, &prg).unwrap();
        for (i, x) in (250..400).enumerate() {
            let want = if x == 300 { 9u16 } else { 0 };
            assert_eq!(combine(out0[i], out1[i]), want);
        }
    }

    #[test]
    fn full_eval_matches_point_function_everywhere() {
        let prg = Aes128Prg::new();
        let mut rng = sampler(23);
        let domain_bits = 7u32;
        let domain_size = 1u64 << domain_bits;
        let (key0, key1) = deal::<u8, _, _>(domain_bits, &AlphaSpec::Concrete(5), &[OutputSpec::Concrete(3u8)], &prg, &mut rng).unwrap();
        let out0 = eval_full(&key0, 0, domain_size, &prg).unwrap();
        let out1 = eval_full(&key1, 0, domain_size, &prg).unwrap();
        assert_eq!(out0.len(), domain_size as usize);
        for x in 0..domain_size as usize {
            let want = if x == 5 { 3u8 } else { 0 };
            assert_eq!(combine(out0[x], out1[x]), want);
        }
    }

    #[test]
    fn sequence_eval_matches_point_eval_for_arbitrary_unsorted_list() {
        let prg = Aes128Prg::new();
        let mut rng = sampler(24);
        let domain_bits = 10u32;
        let domain_size = 1u64 << domain_bits;
        let (key0, key1) = deal::<u32, _, _>(domain_bits, &AlphaSpec::Concrete(900), &[OutputSpec::Concrete(4u32)], &prg, &mut rng).unwrap();
        let xs = vec![900u64, 1, 1023, 900, 500];
        let out0 = eval_sequence(&key0, 0, &xs, domain_size, &prg).unwrap();
        let out1 = eval_sequence(&key1, 0, &xs, domain_size, &prg).unwrap();
        for (j, &x) in xs.iter().enumerate() {
            let want = if x == 900 { 4u32 } else { 0 };
            assert_eq!(combine(out0[j], out1[j]), want);
        }
    }

    #[test]
    fn scenario_s3_heterogeneous_pair_output() {
        let prg = Aes128Prg::new();
        let mut rng = sampler(25);
        let domain_bits = 16u32;
        let domain_size = 1u64 << domain_bits;
        let alpha = 0xBEEFu64;
        let beta: (u32, u16) = (0xDEAD_BEEF, 0xCAFE);
        let (key0, key1) = deal::<(u32, u16), _, _>(domain_bits, &AlphaSpec::Concrete(alpha), &[OutputSpec::Concrete(beta)], &prg, &mut rng).unwrap();
        let mut m0 = LcpPathMemoizer::new();
        let mut m1 = LcpPathMemoizer::new();
        for x in [0u64, 1, alpha, alpha + 1, domain_size - 1] {
            let y0 = eval_point(&key0, 0, x, domain_size, &mut m0, &prg).unwrap();
            let y1 = eval_point(&key1, 0, x, domain_size, &mut m1, &prg).unwrap();
            let want = if x == alpha { beta } else { (0, 0) };
            assert_eq!(combine(y0, y1), want);
        }
    }

    proptest! {
        /// Invariant 1 (correctness, spec §8): `eval0(x) + eval1(x)` equals
        /// `beta` at `x == alpha` and zero everywhere else, for any `alpha`,
        /// `beta`, and probed `x` within the domain.
        #[test]
        fn prop_point_eval_reconstructs_beta_only_at_alpha(alpha in 0u64..256, beta in any::<u32>(), x in 0u64..256) {
            let prg = Aes128Prg::new();
            let mut rng = sampler(alpha ^ u64::from(beta) ^ x);
            let domain_bits = 8u32;
            let domain_size = 1u64 << domain_bits;
            let (key0, key1) = deal::<u32, _, _>(domain_bits, &AlphaSpec::Concrete(alpha), &[OutputSpec::Concrete(beta)], &prg, &mut rng).unwrap();
            let mut m0 = LcpPathMemoizer::new();
            let mut m1 = LcpPathMemoizer::new();
            let y0 = eval_point(&key0, 0, x, domain_size, &mut m0, &prg).unwrap();
            let y1 = eval_point(&key1, 0, x, domain_size, &mut m1, &prg).unwrap();
            let want = if x == alpha { beta } else { 0 };
            prop_assert_eq!(combine(y0, y1), want);
        }

        /// Invariant 6 (interval/full equivalence, spec §8): for every `x` in
        /// an interval (or the full domain), the evaluator's `x`-th result
        /// equals the point evaluator's result at `x`.
        #[test]
        fn prop_interval_and_full_eval_agree_with_point_eval(alpha in 0u64..512, beta in any::<u16>(), lo in 0u64..256, len in 1u64..256) {
            let prg = Aes128Prg::new();
            let mut rng = sampler(alpha ^ u64::from(beta) ^ lo ^ len);
            let domain_bits = 9u32;
            let domain_size = 1u64 << domain_bits;
            let hi = (lo + len).min(domain_size);
            prop_assume!(lo < hi);
            let (key0, key1) = deal::<u16, _, _>(domain_bits, &AlphaSpec::Concrete(alpha), &[OutputSpec::Concrete(beta)], &prg, &mut rng).unwrap();

            let out0 = eval_interval(&key0, 0, lo, hi, domain_size, &prg).unwrap();
            let out1 = eval_interval(&key1, 0, lo, hi, domain_size, &prg).unwrap();
            let mut m0 = LcpPathMemoizer::new();
            let mut m1 = LcpPathMemoizer::new();
            for (i, x) in (lo..hi).enumerate() {
                let py0 = eval_point(&key0, 0, x, domain_size, &mut m0, &prg).unwrap();
                let py1 = eval_point(&key1, 0, x, domain_size, &mut m1, &prg).unwrap();
                prop_assert_eq!(combine(out0[i], out1[i]), combine(py0, py1));
            }

            let full0 = eval_full(&key0, 0, domain_size, &prg).unwrap();
            let full1 = eval_full(&key1, 0, domain_size, &prg).unwrap();
            for x in 0..domain_size {
                let py0 = eval_point(&key0, 0, x, domain_size, &mut m0, &prg).unwrap();
                let py1 = eval_point(&key1, 0, x, domain_size, &mut m1, &prg).unwrap();
                prop_assert_eq!(combine(full0[x as usize], full1[x as usize]), combine(py0, py1));
            }
        }

        /// Invariant 7 (sequence ≡ point, spec §8): for any list of probed
        /// inputs (sorted, unsorted, or with repeats), sequence evaluation at
        /// index `j` equals point evaluation at `x_j`.
        #[test]
        fn prop_sequence_eval_matches_point_eval_for_any_list(alpha in 0u64..1024, beta in any::<u32>(), xs in prop::collection::vec(0u64..1024, 1..16)) {
            let prg = Aes128Prg::new();
            let mut rng = sampler(alpha ^ u64::from(beta) ^ xs.len() as u64);
            let domain_bits = 10u32;
            let domain_size = 1u64 << domain_bits;
            let (key0, key1) = deal::<u32, _, _>(domain_bits, &AlphaSpec::Concrete(alpha), &[OutputSpec::Concrete(beta)], &prg, &mut rng).unwrap();

            let seq0 = eval_sequence(&key0, 0, &xs, domain_size, &prg).unwrap();
            let seq1 = eval_sequence(&key1, 0, &xs, domain_size, &prg).unwrap();
            let mut m0 = LcpPathMemoizer::new();
            let mut m1 = LcpPathMemoizer::new();
            for (j, &x) in xs.iter().enumerate() {
                let py0 = eval_point(&key0, 0, x, domain_size, &mut m0, &prg).unwrap();
                let py1 = eval_point(&key1, 0, x, domain_size, &mut m1, &prg).unwrap();
                prop_assert_eq!(combine(seq0[j], seq1[j]), combine(py0, py1));
            }
        }
    }
}
