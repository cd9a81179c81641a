//! Player slot allocation
//!
//! A bounded pool of controller-context identifiers for multi-instance
//! operation. The allocator is an explicit object handed to each
//! [`crate::InputController`] rather than process-wide state, so embedders
//! that want isolated pools (tests, split front-ends) can have them.

use std::sync::{Arc, Mutex, PoisonError};

/// Fixed number of simultaneous controller contexts.
pub const MAX_PLAYERS: usize = 4;

/// Bounded pool of player slots.
///
/// Claiming hands out the first free slot; exhaustion aborts, because a
/// fifth context is an embedder programming error, not a runtime fault.
#[derive(Debug, Default)]
pub struct PlayerAllocator {
    claimed: Mutex<u8>,
}

impl PlayerAllocator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claims the first free slot.
    ///
    /// # Panics
    ///
    /// Panics when all [`MAX_PLAYERS`] slots are claimed.
    pub fn claim(self: &Arc<Self>) -> PlayerHandle {
        let mut claimed = self
            .claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for id in 0..MAX_PLAYERS {
            if *claimed & (1 << id) == 0 {
                *claimed |= 1 << id;
                return PlayerHandle {
                    id,
                    pool: Arc::clone(self),
                };
            }
        }
        panic!("all {MAX_PLAYERS} player slots are claimed; a controller context was leaked");
    }

    /// Number of currently claimed slots.
    pub fn claimed_count(&self) -> usize {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count_ones() as usize
    }

    fn release(&self, id: usize) {
        let mut claimed = self
            .claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *claimed &= !(1 << id);
    }
}

/// Exclusive ownership of one player slot; dropping it frees the slot.
#[derive(Debug)]
pub struct PlayerHandle {
    id: usize,
    pool: Arc<PlayerAllocator>,
}

impl PlayerHandle {
    pub fn id(&self) -> usize {
        self.id
    }
}

impl Drop for PlayerHandle {
    fn drop(&mut self) {
        self.pool.release(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_are_distinct_and_ordered() {
        let pool = PlayerAllocator::new();
        let handles: Vec<_> = (0..MAX_PLAYERS).map(|_| pool.claim()).collect();
        let ids: Vec<_> = handles.iter().map(PlayerHandle::id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(pool.claimed_count(), MAX_PLAYERS);
    }

    #[test]
    #[should_panic(expected = "player slots are claimed")]
    fn test_exhaustion_is_fatal() {
        let pool = PlayerAllocator::new();
        let _handles: Vec<_> = (0..MAX_PLAYERS).map(|_| pool.claim()).collect();
        let _ = pool.claim();
    }

    #[test]
    fn test_release_makes_slot_reusable() {
        let pool = PlayerAllocator::new();
        let first = pool.claim();
        let _second = pool.claim();
        assert_eq!(first.id(), 0);

        drop(first);
        assert_eq!(pool.claimed_count(), 1);

        let reclaimed = pool.claim();
        assert_eq!(reclaimed.id(), 0);
    }

    #[test]
    fn test_release_fills_gaps_first() {
        let pool = PlayerAllocator::new();
        let a = pool.claim();
        let b = pool.claim();
        let _c = pool.claim();
        drop(b);
        drop(a);
        assert_eq!(pool.claim().id(), 0);
        assert_eq!(pool.claim().id(), 1);
    }

    #[test]
    fn test_separate_pools_are_independent() {
        let pool_a = PlayerAllocator::new();
        let pool_b = PlayerAllocator::new();
        let _a: Vec<_> = (0..MAX_PLAYERS).map(|_| pool_a.claim()).collect();
        // A full pool elsewhere does not affect this one.
        assert_eq!(pool_b.claim().id(), 0);
    }
}
