// crates/dpf-core/src/digest.rs

//! `common_part_hash`: a BLAKE3 digest over everything two honest parties'
//! keys must agree on bit-for-bit, used to detect key mismatches. Domain
//! separation mirrors a transcript's absorb discipline: a fixed prefix,
//! then length-prefixed fields, so no two distinct
//! `(correction_words, correction_advice, leaves, wildcard_mask)` tuples can
//! collide across a field boundary.
//!
//! Field order (fixed, see `DESIGN.md`): root, correction words in level
//! order, the correction-advice byte string, each leaf's packed values in
//! output-slot order, then the wildcard mask.

const DIGEST_PREFIX: &[u8] = b"dpf.common_part_hash.v1";

/// Incrementally absorbs length-prefixed fields and finalizes to a 32-byte
/// digest.
pub struct CommonPartHasher(blake3::Hasher);

impl CommonPartHasher {
    #[must_use]
    pub fn new() -> Self {
        let mut h = blake3::Hasher::new();
        h.update(DIGEST_PREFIX);
        Self(h)
    }

    pub fn absorb(&mut self, field: &[u8]) -> &mut Self {
        self.0.update(&(field.len() as u64).to_le_bytes());
        self.0.update(field);
        self
    }

    #[must_use]
    pub fn finalize(&self) -> [u8; 32] {
        *self.0.finalize().as_bytes()
    }
}

impl Default for CommonPartHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_fields_hash_equal() {
        let mut a = CommonPartHasher::new();
        a.absorb(b"alpha").absorb(b"beta");
        let mut b = CommonPartHasher::new();
        b.absorb(b"alpha").absorb(b"beta");
        assert_eq!(a.finalize(), b.finalize());
    }

    #[test]
    fn field_boundaries_are_not_confusable() {
        let mut a = CommonPartHasher::new();
        a.absorb(b"al").absorb(b"phabeta");
        let mut b = CommonPartHasher::new();
        b.absorb(b"alpha").absorb(b"beta");
        assert_ne!(a.finalize(), b.finalize());
    }
}
