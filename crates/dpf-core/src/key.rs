// crates/dpf-core/src/key.rs

//! The immutable per-party key object and the per-output leaf layer it is
//! built from.

use crate::block::Block;
use crate::digest::CommonPartHasher;
use crate::error::{DpfError, Result};
use crate::leaf::{self, LeafBlock};
use crate::output::Output;
use crate::prg::Prg;
use crate::tree::Tree;
use crate::wildcard::WildcardCell;

/// Beaver-triple material for one wildcard output slot: `(output_blind r,
/// vector_blind v, blinded_vector V = r*v + seed_diff_leaf_layer)`, one
/// instance per party.
#[derive(Clone, Debug)]
pub struct Beaver<O: Output> {
    pub output_blind: O,
    pub vector_blind: Vec<O>,
    pub blinded_vector: Vec<O>,
}

/// One output slot's leaf material: the packed leaf itself, its wildcard
/// state, and (if it is a wildcard) its beaver triple.
pub struct LeafLayer<O: Output> {
    pub leaf: LeafBlock<O>,
    pub wildcard: WildcardCell,
    pub beaver: Option<Beaver<O>>,
}

impl<O: Output> LeafLayer<O> {
    #[must_use]
    pub fn concrete(leaf: LeafBlock<O>) -> Self {
        Self { leaf, wildcard: WildcardCell::new(false), beaver: None }
    }

    #[must_use]
    pub fn wildcard(leaf: LeafBlock<O>, beaver: Beaver<O>) -> Self {
        Self { leaf, wildcard: WildcardCell::new(true), beaver: Some(beaver) }
    }

    /// `traverse_exterior(node, cw_i) = subtract_leaf(make_leaf_mask_inner(clear_low_2bits(node)), get_if_low_bit(cw_i, node))`.
    #[must_use]
    pub fn traverse_exterior<P: Prg + ?Sized>(&self, prg: &P, node: Block) -> LeafBlock<O> {
        let mask = leaf::expand_leaf::<O, P>(prg, node.clear_low_2bits());
        let apply_cw = node.get_low_bit() != 0;
        LeafBlock(
            mask.0
                .iter()
                .zip(self.leaf.0.iter())
                .map(|(m, cw)| if apply_cw { m.sub(*cw) } else { *m })
                .collect(),
        )
    }
}

/// An immutable, per-party DPF key for `k` outputs sharing the same output
/// type `O`. Constructed only by `dpf-gen`'s dealer.
pub struct Key<O: Output> {
    pub party: u8,
    pub tree: Tree,
    pub leaves: Vec<LeafLayer<O>>,
    pub input_wildcard: WildcardCell,
    pub offset_share: u64,
    common_part_hash: [u8; 32],
}

impl<O: Output> Key<O> {
    #[must_use]
    pub fn new(party: u8, tree: Tree, leaves: Vec<LeafLayer<O>>, input_is_wildcard: bool, offset_share: u64) -> Self {
        let common_part_hash = Self::compute_common_part_hash(&tree, &leaves, input_is_wildcard);
        Self { party, tree, leaves, input_wildcard: WildcardCell::new(input_is_wildcard), offset_share, common_part_hash }
    }

    fn compute_common_part_hash(tree: &Tree, leaves: &[LeafLayer<O>], input_is_wildcard: bool) -> [u8; 32] {
        let mut hasher = CommonPartHasher::new();
        hasher.absorb(&tree.root.to_le_bytes());
        for cw in &tree.correction_words {
            hasher.absorb(&cw.to_le_bytes());
        }
        hasher.absorb(&tree.correction_advice);
        for layer in leaves {
            let mut bytes = Vec::new();
            for v in &layer.leaf.0 {
                v.write_le_bytes(&mut bytes);
            }
            hasher.absorb(&bytes);
        }
        let mut wildcard_mask = Vec::with_capacity(leaves.len() + 1);
        wildcard_mask.push(u8::from(input_is_wildcard));
        for layer in leaves {
            wildcard_mask.push(u8::from(!layer.wildcard.is_ready()));
        }
        hasher.absorb(&wildcard_mask);
        hasher.finalize()
    }

    #[must_use]
    pub fn common_part_hash(&self) -> [u8; 32] {
        self.common_part_hash
    }

    pub fn check_common_part_hash(&self, peer: [u8; 32]) -> Result<()> {
        if self.common_part_hash == peer {
            Ok(())
        } else {
            Err(DpfError::KeyMismatch)
        }
    }

    /// Refuses to proceed if either the input `α` or the given output slot
    /// is still an unresolved wildcard (spec §4.5: "every evaluator refuses
    /// inputs targeting a slot whose wildcard bit is set").
    pub fn ensure_ready(&self, slot: usize) -> Result<()> {
        if !self.input_wildcard.is_ready() {
            return Err(DpfError::NotReady { slot: usize::MAX });
        }
        if !self.leaves[slot].wildcard.is_ready() {
            return Err(DpfError::NotReady { slot });
        }
        Ok(())
    }
}
