//! Single-writer, many-reader latest-value slots.
//!
//! A [`SharedSlot`] publishes a whole payload record under a seqlock:
//! the writer brackets the payload store between two bumps of the
//! sequence word, leaving it odd while the store is in flight. Readers
//! copy the payload between two loads of the word and retry whenever it
//! was odd or moved — a torn read can never escape. The word is even
//! between publishes, so the externally visible sequence is `word / 2`
//! and advances by exactly one per publish.

use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{fence, AtomicBool, AtomicU64, Ordering};

/// A latest-value slot with seqlock publication.
///
/// The layout is `#[repr(C)]` so both processes agree on field offsets,
/// and the all-zeroes state is the sentinel: sequence 0, not ready.
///
/// # Single writer
///
/// Exactly one thread in one process may call [`publish`](Self::publish);
/// concurrent writers would race on the payload store. Any number of
/// readers may call [`read`](Self::read) concurrently from any process
/// mapping the region.
#[repr(C)]
pub struct SharedSlot<T> {
    /// Seqlock word: odd while a publish is writing the payload, even
    /// otherwise. The publish count is `word / 2`.
    sequence: AtomicU64,
    /// Set on first publish. Readers treat an un-ready slot as empty.
    ready: AtomicBool,
    /// The latest payload. Written only by the single writer, inside
    /// the odd phase of `sequence`.
    payload: UnsafeCell<T>,
}

// SAFETY: readers access `payload` only through the seqlock protocol in
// `read`, which discards any copy that overlapped a writer store; all
// other shared state is atomic.
unsafe impl<T: Copy + Send> Sync for SharedSlot<T> {}

impl<T: Copy> SharedSlot<T> {
    /// Publish a new payload value.
    pub fn publish(&self, value: &T) {
        let word = self.sequence.load(Ordering::Relaxed);
        // Enter the write section: readers seeing an odd word retry.
        self.sequence.store(word.wrapping_add(1), Ordering::Relaxed);
        // Keep the payload store inside the odd phase.
        fence(Ordering::Release);

        // SAFETY: single-writer contract; readers that overlap this
        // store observe an odd or changed sequence word and retry.
        unsafe { ptr::write_volatile(self.payload.get(), *value) };

        // Leave the write section; the release store publishes the
        // payload bytes to acquiring readers.
        self.sequence
            .store(word.wrapping_add(2), Ordering::Release);
        self.ready.store(true, Ordering::Release);
    }

    /// The number of publishes so far. Monotonic and gap-free: each
    /// publish advances it by exactly one.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Acquire) / 2
    }

    /// Whether anything has been published yet.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Read a consistent copy of the payload and its publish sequence.
    ///
    /// Spins while a publish is in flight; with a single writer this
    /// terminates as soon as the reader overlaps no publish.
    #[must_use]
    pub fn read(&self) -> (u64, T) {
        loop {
            let before = self.sequence.load(Ordering::Acquire);
            if before % 2 != 0 {
                // A publish is mid-flight.
                std::hint::spin_loop();
                continue;
            }

            // SAFETY: this copy may overlap a concurrent publish; the
            // sequence recheck below discards any torn value.
            let value = unsafe { ptr::read_volatile(self.payload.get()) };

            // Order the payload copy before the second sequence load.
            fence(Ordering::Acquire);
            let after = self.sequence.load(Ordering::Relaxed);
            if before == after {
                return (after / 2, value);
            }
            std::hint::spin_loop();
        }
    }

    /// Read the payload only if it is newer than `last_sequence`
    /// publishes.
    ///
    /// Returns `None` when nothing has been published or the slot has
    /// not advanced past the given publish count.
    #[must_use]
    pub fn read_newer(&self, last_sequence: u64) -> Option<(u64, T)> {
        if !self.is_ready() {
            return None;
        }
        if self.sequence() <= last_sequence {
            return None;
        }
        let (sequence, value) = self.read();
        (sequence > last_sequence).then_some((sequence, value))
    }
}
