// crates/dpf-prg/src/lib.rs

//! A concrete, fixed-key AES-128 implementation of `dpf_core::Prg`.
//!
//! The spec treats the PRG as an external collaborator specified only by
//! its interface; this crate supplies the one concrete instance the rest of
//! the workspace exercises end to end. Three independently-keyed AES-128
//! instances realize a Matyas-Meyer-Oseas-style length-doubling
//! construction: one per interior child direction, one for the bulk
//! exterior-layer expansion. Fixed, public, baked-in keys are appropriate
//! here because a DPF's security rests on the *seed*, not on the PRG key
//! being secret.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;

use dpf_core::{Block, Prg};

const KEY_LEFT: [u8; 16] = *b"dpf-prg-left-key";
const KEY_RIGHT: [u8; 16] = *b"dpf-prg-right-ky";
const KEY_EXTERIOR: [u8; 16] = *b"dpf-prg-ext--key";

/// AES-128-backed `Prg` implementation.
pub struct Aes128Prg {
    left: Aes128,
    right: Aes128,
    exterior: Aes128,
}

impl Aes128Prg {
    #[must_use]
    pub fn new() -> Self {
        Self {
            left: Aes128::new(GenericArray::from_slice(&KEY_LEFT)),
            right: Aes128::new(GenericArray::from_slice(&KEY_RIGHT)),
            exterior: Aes128::new(GenericArray::from_slice(&KEY_EXTERIOR)),
        }
    }

    /// Matyas-Meyer-Oseas compression: `AES_k(x) XOR x`, giving a
    /// one-way, collision-resistant-under-ideal-cipher expansion from a
    /// plain block cipher.
    fn compress(cipher: &Aes128, input: Block) -> Block {
        let mut buf = GenericArray::clone_from_slice(&input.to_le_bytes());
        cipher.encrypt_block(&mut buf);
        let mut out = [0u8; 16];
        out.copy_from_slice(&buf);
        Block::from_le_bytes(out) ^ input
    }
}

impl Default for Aes128Prg {
    fn default() -> Self {
        Self::new()
    }
}

impl Prg for Aes128Prg {
    fn eval(&self, block: Block, index: u8) -> Block {
        match index {
            0 => Self::compress(&self.left, block),
            1 => Self::compress(&self.right, block),
            other => panic!("Prg::eval index must be 0 or 1, got {other}"),
        }
    }

    fn eval01(&self, block: Block) -> (Block, Block) {
        (Self::compress(&self.left, block), Self::compress(&self.right, block))
    }

    fn eval_exterior(&self, seed: Block, pos: u64, count: usize) -> Vec<Block> {
        (0..count)
            .map(|i| {
                let tweak = Block::from_u128(seed.as_u128() ^ u128::from(pos + i as u64));
                Self::compress(&self.exterior, tweak)
            })
            .collect()
    }
}
