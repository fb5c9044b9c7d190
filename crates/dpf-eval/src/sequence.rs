// crates/dpf-eval/src/sequence.rs

//! Sequence evaluation: given a sorted list of inputs, build a "recipe" of
//! per-step longest-common-prefix reuse once, then replay it against a
//! specific key. Grounded on
//! `original_source/include/dpf/eval_sequence.hpp`. See `DESIGN.md` decisions
//! 4 and 5: the forward, non-reversing write order is the primary memoizer;
//! `output_indices` covers every input including the first.

use dpf_core::{Block, Prg, Tree};

use crate::path::common_prefix_len;

/// One step of a recipe: how far back to reuse the live path stack before
/// re-walking the remaining bits of this element's node index.
#[derive(Clone, Copy, Debug)]
pub struct Step {
    pub lcp: usize,
    pub node_index: u64,
}

/// A reusable navigation plan for a sorted list of tree-node indices: which
/// original list position each step corresponds to, and how much of the
/// previous step's path it shares.
#[derive(Clone, Debug)]
pub struct Recipe {
    /// `order[i]` is the original list index visited at recipe step `i`.
    pub order: Vec<usize>,
    pub steps: Vec<Step>,
    /// `output_indices[j]` is the node index for original list element `j`,
    /// for every `j`, including the first.
    pub output_indices: Vec<u64>,
}

/// Builds a recipe from `node_indices` (one tree-node index per input,
/// in original list order; need not already be sorted).
#[must_use]
pub fn make_recipe(node_indices: &[u64], depth: usize) -> Recipe {
    let mut order: Vec<usize> = (0..node_indices.len()).collect();
    order.sort_by_key(|&i| node_indices[i]);

    let mut steps = Vec::with_capacity(order.len());
    let mut last: Option<u64> = None;
    for &i in &order {
        let x = node_indices[i];
        let lcp = last.map_or(0, |prev| common_prefix_len(prev, x, depth));
        steps.push(Step { lcp, node_index: x });
        last = Some(x);
    }

    Recipe { order, steps, output_indices: node_indices.to_vec() }
}

/// Replays a recipe against a specific `(tree, prg)`, returning the interior
/// node reached for each *original* list position.
pub fn evaluate_recipe<P: Prg + ?Sized>(recipe: &Recipe, tree: &Tree, prg: &P) -> Vec<Block> {
    let d = tree.depth();
    let mut out = vec![Block::ZERO; recipe.order.len()];
    let mut path: Vec<Block> = vec![tree.root];

    for (step, &orig_idx) in recipe.steps.iter().zip(recipe.order.iter()) {
        path.truncate(step.lcp + 1);
        let mut node = *path.last().expect("path always has at least the root");
        for level in step.lcp..d {
            let bit = ((step.node_index >> (d - 1 - level)) & 1) as u8;
            let cw = tree.correction_word_for_direction(level, bit);
            node = Tree::traverse_interior(prg, node, cw, bit);
            path.push(node);
        }
        out[orig_idx] = node;
    }
    out
}

/// The reversed write-order variant (`DESIGN.md` decision 4): walks the
/// sorted sequence from the high end down, otherwise identical. Kept as a
/// distinct entry point rather than a runtime branch, since the two orders
/// are genuinely different memory/bookkeeping trade-offs.
pub fn evaluate_recipe_reversing<P: Prg + ?Sized>(recipe: &Recipe, tree: &Tree, prg: &P) -> Vec<Block> {
    let d = tree.depth();
    let mut out = vec![Block::ZERO; recipe.order.len()];
    let mut path: Vec<Block> = vec![tree.root];
    let mut last: Option<u64> = None;

    for &orig_idx in recipe.order.iter().rev() {
        let x = recipe.output_indices[orig_idx];
        let lcp = last.map_or(0, |prev| common_prefix_len(prev, x, d));
        path.truncate(lcp + 1);
        let mut node = *path.last().expect("path always has at least the root");
        for level in lcp..d {
            let bit = ((x >> (d - 1 - level)) & 1) as u8;
            let cw = tree.correction_word_for_direction(level, bit);
            node = Tree::traverse_interior(prg, node, cw, bit);
            path.push(node);
        }
        last = Some(x);
        out[orig_idx] = node;
    }
    out
}
