//! Shared chunk offset allocator for dynamic work distribution

use chunkcp_types::ChunkSize;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Cursor {
    next: u64,
    issued: u64,
}

/// Hands out chunk offsets `0, step, 2*step, ...` below `bound`, each exactly once
///
/// The cursor is only reachable through [`SharedOffsetAllocator::next`], which
/// reads and advances it inside a single critical section. No I/O ever happens
/// under the lock.
#[derive(Debug)]
pub struct SharedOffsetAllocator {
    cursor: Mutex<Cursor>,
    bound: u64,
    step: u64,
}

impl SharedOffsetAllocator {
    /// Create an allocator over `[0, bound)` advancing by `step`
    pub fn new(bound: u64, step: ChunkSize) -> Self {
        Self {
            cursor: Mutex::new(Cursor::default()),
            bound,
            step: step.as_u64(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cursor> {
        // The critical sections cannot panic, so a poisoned cursor is still consistent.
        self.cursor
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    /// Claim the next offset, or `None` once the bound is reached
    pub fn next(&self) -> Option<u64> {
        let mut cursor = self.lock();
        if cursor.next >= self.bound {
            return None;
        }
        let offset = cursor.next;
        cursor.next = cursor.next.saturating_add(self.step);
        cursor.issued += 1;
        Some(offset)
    }

    /// Rewind to offset 0 so the allocator can serve another transfer
    pub fn reset(&self) {
        *self.lock() = Cursor::default();
    }

    /// Offsets handed out since creation or the last reset
    pub fn issued(&self) -> u64 {
        self.lock().issued
    }

    /// Upper bound (the file size)
    pub fn bound(&self) -> u64 {
        self.bound
    }

    /// Distance between consecutive offsets
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Number of offsets a full drain yields: `ceil(bound / step)`
    pub fn expected_claims(&self) -> u64 {
        self.bound.div_ceil(self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn allocator(bound: u64, step: usize) -> SharedOffsetAllocator {
        SharedOffsetAllocator::new(bound, ChunkSize::new(step).unwrap())
    }

    #[test]
    fn test_sequence_and_exhaustion() {
        let alloc = allocator(10, 4);
        assert_eq!(alloc.next(), Some(0));
        assert_eq!(alloc.next(), Some(4));
        assert_eq!(alloc.next(), Some(8));
        assert_eq!(alloc.next(), None);
        assert_eq!(alloc.next(), None);
        assert_eq!(alloc.issued(), 3);
        assert_eq!(alloc.expected_claims(), 3);
        assert_eq!((alloc.bound(), alloc.step()), (10, 4));
    }

    #[test]
    fn test_poisoned_cursor_keeps_serving() {
        let alloc = allocator(12, 4);
        assert_eq!(alloc.next(), Some(0));

        let panicked = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = alloc.cursor.lock().unwrap();
                    panic!("holder died");
                })
                .join()
                .is_err()
        });

        assert!(panicked);
        assert!(alloc.cursor.is_poisoned());
        assert_eq!(alloc.next(), Some(4));
        assert_eq!(alloc.next(), Some(8));
        assert_eq!(alloc.next(), None);
        assert_eq!(alloc.issued(), 3);
    }

    #[test]
    fn test_empty_bound() {
        let alloc = allocator(0, 4);
        assert_eq!(alloc.next(), None);
        assert_eq!(alloc.issued(), 0);
    }

    #[test]
    fn test_reset() {
        let alloc = allocator(8, 4);
        while alloc.next().is_some() {}
        alloc.reset();
        assert_eq!(alloc.issued(), 0);
        assert_eq!(alloc.next(), Some(0));
    }

    #[test]
    fn test_concurrent_draw_is_unique() {
        let alloc = allocator(1_000_003, 97);
        let claims: Vec<Vec<u64>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        let mut mine = Vec::new();
                        while let Some(offset) = alloc.next() {
                            mine.push(offset);
                        }
                        mine
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let all: Vec<u64> = claims.into_iter().flatten().collect();
        let unique: HashSet<u64> = all.iter().copied().collect();
        assert_eq!(all.len(), unique.len());
        assert_eq!(all.len() as u64, alloc.expected_claims());
        assert!(unique.iter().all(|offset| offset % 97 == 0 && *offset < 1_000_003));
    }

    proptest! {
        #[test]
        fn test_claim_count_is_ceil(bound in 0u64..100_000, step in 1usize..5_000) {
            let alloc = allocator(bound, step);
            let mut count = 0u64;
            let mut last = None;
            while let Some(offset) = alloc.next() {
                if let Some(prev) = last {
                    prop_assert_eq!(offset, prev + step as u64);
                }
                last = Some(offset);
                count += 1;
            }
            prop_assert_eq!(count, (bound + step as u64 - 1) / step as u64);
            prop_assert_eq!(alloc.next(), None);
        }
    }
}
