// crates/dpf-eval/src/path.rs

//! Path memoizers: how `eval_point` reaches the interior node for a given
//! input. Grounded on
//! `original_source/include/dpf/path_memoizer.hpp`, which defines both a
//! longest-common-prefix-reusing memoizer and a non-memoizing one; both are
//! kept here as the two points on the same trade-off curve.

use core::marker::PhantomData;

use dpf_core::{Block, Prg, Tree};

/// Resolves the interior node reached by walking `x_node`'s path, given the
/// option to reuse work from a previous call.
pub trait PathMemoizer<P: Prg + ?Sized> {
    fn node_at(&mut self, tree: &Tree, prg: &P, x_node: u64) -> Block;
}

/// Length, in bits, of the common MSB-first prefix of `a` and `b` over a
/// `d`-bit domain.
#[must_use]
pub fn common_prefix_len(a: u64, b: u64, d: usize) -> usize {
    for level in 0..d {
        let shift = d - 1 - level;
        if ((a >> shift) & 1) != ((b >> shift) & 1) {
            return level;
        }
    }
    d
}

/// Reuses the longest common prefix between consecutive calls' `x_node`,
/// re-walking only the suffix that differs (`basic_path_memoizer`).
pub struct LcpPathMemoizer<P: ?Sized> {
    path: Vec<Block>,
    last_x: Option<u64>,
    _prg: PhantomData<fn(&P)>,
}

impl<P: Prg + ?Sized> Default for LcpPathMemoizer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Prg + ?Sized> LcpPathMemoizer<P> {
    #[must_use]
    pub fn new() -> Self {
        Self { path: Vec::new(), last_x: None, _prg: PhantomData }
    }
}

impl<P: Prg + ?Sized> PathMemoizer<P> for LcpPathMemoizer<P> {
    fn node_at(&mut self, tree: &Tree, prg: &P, x_node: u64) -> Block {
        let d = tree.depth();
        if self.path.is_empty() {
            self.path.push(tree.root);
        }
        let lcp = match self.last_x {
            Some(prev) => common_prefix_len(prev, x_node, d),
            None => 0,
        };
        self.path.truncate(lcp + 1);
        let mut node = *self.path.last().expect("path always has at least the root");
        for level in lcp..d {
            let bit = ((x_node >> (d - 1 - level)) & 1) as u8;
            let cw = tree.correction_word_for_direction(level, bit);
            node = Tree::traverse_interior(prg, node, cw, bit);
            self.path.push(node);
        }
        self.last_x = Some(x_node);
        node
    }
}

/// Always walks from the root (`nonmemoizing_path_memoizer`): appropriate
/// when a key is only ever queried once, where keeping LCP state would be
/// pure overhead.
#[derive(Default)]
pub struct NonMemoizingPathMemoizer;

impl<P: Prg + ?Sized> PathMemoizer<P> for NonMemoizingPathMemoizer {
    fn node_at(&mut self, tree: &Tree, prg: &P, x_node: u64) -> Block {
        tree.walk(prg, x_node)
    }
}
