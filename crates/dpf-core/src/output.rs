// crates/dpf-core/src/output.rs

//! Typed output values and the two arithmetics the leaf layer and wildcard
//! completion need: additive reconstruction (`add`/`sub`) and the scalar
//! ring multiply used only by beaver-triple completion (`mul`).

use serde::{Deserialize, Serialize};

/// A DPF output value: trivially copyable, fixed-width, with the ring
/// operations the leaf layer and wildcard completion need.
pub trait Output: Copy + Clone + PartialEq + core::fmt::Debug + Send + Sync + 'static {
    /// Bit width of one value (not of a packed leaf).
    const WIDTH_BITS: u32;

    /// The additive identity.
    const ZERO: Self;

    /// The multiplicative identity, used only to fold a publicly-known
    /// `+1`/`-1` sign into wildcard-completion arithmetic.
    const ONE: Self;

    #[must_use]
    fn add(self, other: Self) -> Self;

    #[must_use]
    fn sub(self, other: Self) -> Self;

    /// Elementwise ring multiply, used only by beaver-triple completion.
    #[must_use]
    fn mul(self, other: Self) -> Self;

    #[must_use]
    fn from_le_bytes(bytes: &[u8]) -> Self;

    fn write_le_bytes(self, out: &mut Vec<u8>);
}

macro_rules! impl_output_for_uint {
    ($t:ty) => {
        impl Output for $t {
            const WIDTH_BITS: u32 = (core::mem::size_of::<$t>() * 8) as u32;
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            fn add(self, other: Self) -> Self {
                self.wrapping_add(other)
            }

            #[inline]
            fn sub(self, other: Self) -> Self {
                self.wrapping_sub(other)
            }

            #[inline]
            fn mul(self, other: Self) -> Self {
                self.wrapping_mul(other)
            }

            #[inline]
            fn from_le_bytes(bytes: &[u8]) -> Self {
                let mut buf = [0u8; core::mem::size_of::<$t>()];
                buf.copy_from_slice(&bytes[..core::mem::size_of::<$t>()]);
                <$t>::from_le_bytes(buf)
            }

            #[inline]
            fn write_le_bytes(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }
    };
}

impl_output_for_uint!(u8);
impl_output_for_uint!(u16);
impl_output_for_uint!(u32);
impl_output_for_uint!(u64);

/// A single-bit GF(2) output, used by the prefix/segment-parity gadget.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Bit(pub bool);

impl Output for Bit {
    const WIDTH_BITS: u32 = 1;
    const ZERO: Self = Bit(false);
    const ONE: Self = Bit(true);

    #[inline]
    fn add(self, other: Self) -> Self {
        Bit(self.0 ^ other.0)
    }

    #[inline]
    fn sub(self, other: Self) -> Self {
        Bit(self.0 ^ other.0)
    }

    #[inline]
    fn mul(self, other: Self) -> Self {
        Bit(self.0 & other.0)
    }

    #[inline]
    fn from_le_bytes(bytes: &[u8]) -> Self {
        Bit(bytes.first().copied().unwrap_or(0) & 1 != 0)
    }

    #[inline]
    fn write_le_bytes(self, out: &mut Vec<u8>) {
        out.push(u8::from(self.0));
    }
}

/// A GF(2)-wrapped integer: `add`/`sub` are XOR, `mul` is bitwise AND.
/// Mirrors the source's `xor_wrapper<T>` output type, giving integer-shaped
/// outputs GF(2) semantics end to end.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct XorWrapper<T>(pub T);

macro_rules! impl_output_for_xor_wrapper {
    ($t:ty) => {
        impl Output for XorWrapper<$t> {
            const WIDTH_BITS: u32 = (core::mem::size_of::<$t>() * 8) as u32;
            const ZERO: Self = XorWrapper(0);
            const ONE: Self = XorWrapper(1);

            #[inline]
            fn add(self, other: Self) -> Self {
                XorWrapper(self.0 ^ other.0)
            }

            #[inline]
            fn sub(self, other: Self) -> Self {
                XorWrapper(self.0 ^ other.0)
            }

            #[inline]
            fn mul(self, other: Self) -> Self {
                XorWrapper(self.0 & other.0)
            }

            #[inline]
            fn from_le_bytes(bytes: &[u8]) -> Self {
                XorWrapper(<$t as Output>::from_le_bytes(bytes))
            }

            #[inline]
            fn write_le_bytes(self, out: &mut Vec<u8>) {
                Output::write_le_bytes(self.0, out);
            }
        }
    };
}

impl_output_for_xor_wrapper!(u8);
impl_output_for_xor_wrapper!(u16);
impl_output_for_xor_wrapper!(u32);
impl_output_for_xor_wrapper!(u64);

/// A heterogeneous pair of outputs sharing one key (one `alpha`, two
/// independently-typed `beta`s). Composes two byte-aligned `Output`s
/// end to end: `WIDTH_BITS` adds, `from_le_bytes`/`write_le_bytes` simply
/// concatenate each component's own encoding. Assumes both components are
/// byte-aligned (true of every integer `Output` in this workspace); pairing
/// a sub-byte type like `Bit` is not supported by this impl.
impl<A: Output, B: Output> Output for (A, B) {
    const WIDTH_BITS: u32 = A::WIDTH_BITS + B::WIDTH_BITS;
    const ZERO: Self = (A::ZERO, B::ZERO);
    const ONE: Self = (A::ONE, B::ONE);

    #[inline]
    fn add(self, other: Self) -> Self {
        (self.0.add(other.0), self.1.add(other.1))
    }

    #[inline]
    fn sub(self, other: Self) -> Self {
        (self.0.sub(other.0), self.1.sub(other.1))
    }

    #[inline]
    fn mul(self, other: Self) -> Self {
        (self.0.mul(other.0), self.1.mul(other.1))
    }

    #[inline]
    fn from_le_bytes(bytes: &[u8]) -> Self {
        let a_len = (A::WIDTH_BITS / 8) as usize;
        (A::from_le_bytes(&bytes[..a_len]), B::from_le_bytes(&bytes[a_len..]))
    }

    #[inline]
    fn write_le_bytes(self, out: &mut Vec<u8>) {
        self.0.write_le_bytes(out);
        self.1.write_le_bytes(out);
    }
}
