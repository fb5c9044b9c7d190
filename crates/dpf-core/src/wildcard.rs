// crates/dpf-core/src/wildcard.rs

//! Monotone, CAS-guarded wildcard state machine: `unset -> computing ->
//! {waiting | blinded} -> ready`. Retries after a failed transition are
//! unsafe because the beaver material has already been revealed, so any
//! failure leaves the slot permanently poisoned in `computing`.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::DpfError;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WildcardState {
    Unset = 0,
    Computing = 1,
    Waiting = 2,
    Blinded = 3,
    Ready = 4,
}

impl WildcardState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Unset,
            1 => Self::Computing,
            2 => Self::Waiting,
            3 => Self::Blinded,
            4 => Self::Ready,
            other => unreachable!("invalid wildcard state byte {other}"),
        }
    }
}

/// A single wildcard slot's state cell.
#[derive(Debug)]
pub struct WildcardCell(AtomicU8);

impl WildcardCell {
    #[must_use]
    pub fn new(is_wildcard: bool) -> Self {
        let initial = if is_wildcard { WildcardState::Unset } else { WildcardState::Ready };
        Self(AtomicU8::new(initial as u8))
    }

    #[must_use]
    pub fn load(&self) -> WildcardState {
        WildcardState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// `unset -> computing`. Sequentially consistent, per the concurrency
    /// model's requirement for the initial transition.
    pub fn begin_completion(&self, slot: usize) -> Result<(), DpfError> {
        self.0
            .compare_exchange(
                WildcardState::Unset as u8,
                WildcardState::Computing as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map(|_| ())
            .map_err(|found| DpfError::ProtocolState {
                slot,
                reason: format!("expected Unset, found {:?}", WildcardState::from_u8(found)),
            })
    }

    /// `computing -> {waiting | blinded}`.
    pub fn advance(&self, slot: usize, to: WildcardState) -> Result<(), DpfError> {
        debug_assert!(matches!(to, WildcardState::Waiting | WildcardState::Blinded));
        self.0
            .compare_exchange(WildcardState::Computing as u8, to as u8, Ordering::Release, Ordering::Acquire)
            .map(|_| ())
            .map_err(|found| DpfError::ProtocolState {
                slot,
                reason: format!("expected Computing, found {:?}", WildcardState::from_u8(found)),
            })
    }

    /// `{waiting | blinded} -> ready`, publishing the completed slot.
    pub fn finish(&self, slot: usize, from: WildcardState) -> Result<(), DpfError> {
        self.0
            .compare_exchange(from as u8, WildcardState::Ready as u8, Ordering::Release, Ordering::Acquire)
            .map(|_| ())
            .map_err(|found| DpfError::ProtocolState {
                slot,
                reason: format!("expected {from:?}, found {:?}", WildcardState::from_u8(found)),
            })
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.load() == WildcardState::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_wildcard_starts_ready() {
        let cell = WildcardCell::new(false);
        assert!(cell.is_ready());
    }

    #[test]
    fn monotone_transition_sequence_succeeds_once() {
        let cell = WildcardCell::new(true);
        assert_eq!(cell.load(), WildcardState::Unset);
        cell.begin_completion(0).unwrap();
        assert_eq!(cell.load(), WildcardState::Computing);
        cell.advance(0, WildcardState::Waiting).unwrap();
        cell.finish(0, WildcardState::Waiting).unwrap();
        assert!(cell.is_ready());
    }

    #[test]
    fn duplicate_completion_attempt_is_fatal() {
        let cell = WildcardCell::new(true);
        cell.begin_completion(0).unwrap();
        assert!(cell.begin_completion(0).is_err());
    }

    #[test]
    fn finish_from_wrong_predecessor_state_is_rejected() {
        let cell = WildcardCell::new(true);
        cell.begin_completion(0).unwrap();
        cell.advance(0, WildcardState::Blinded).unwrap();
        assert!(cell.finish(0, WildcardState::Waiting).is_err());
        assert!(cell.finish(0, WildcardState::Blinded).is_ok());
    }
}
