//! Bounded single-producer, single-consumer trade ring.

use crate::orderbook::types::Trade;
use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{AtomicU32, Ordering};

/// Number of trades the ring can hold at once.
pub const TRADE_RING_CAPACITY: usize = 1000;

/// Backing array length. One slot is sacrificed so that `head == tail`
/// unambiguously means empty, which lets the ring hold exactly
/// [`TRADE_RING_CAPACITY`] trades.
const RING_SLOTS: usize = TRADE_RING_CAPACITY + 1;

/// A lock-free SPSC FIFO of trades in shared memory.
///
/// The engine's submitter thread is the sole producer; the broadcaster's
/// drain loop is the sole consumer. The producer publishes each slot
/// write before the `tail` store (release) and the consumer acquires
/// `tail` before reading the slot, so a popped trade is always fully
/// written.
///
/// A full ring drops the incoming trade: [`push`](Self::push) returns
/// `false` and the caller must count the drop.
#[repr(C)]
pub struct TradeRing {
    /// Consumer cursor: next slot to pop.
    head: AtomicU32,
    /// Producer cursor: next slot to fill.
    tail: AtomicU32,
    /// Trade storage. A slot is owned by the producer until published
    /// via `tail`, then by the consumer until released via `head`.
    trades: [UnsafeCell<Trade>; RING_SLOTS],
}

// SAFETY: each slot is accessed by at most one side at a time, with
// ownership handed over through release/acquire on `tail` and `head`.
unsafe impl Sync for TradeRing {}

impl TradeRing {
    /// Append a trade. Returns `false` (dropping the trade) when the
    /// ring is full; callers must observe the result and account for
    /// the drop.
    ///
    /// Producer side only.
    pub fn push(&self, trade: &Trade) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        let next = (tail + 1) % RING_SLOTS as u32;
        if next == self.head.load(Ordering::Acquire) {
            return false;
        }

        // SAFETY: `tail` slots are owned by the producer until the
        // release store below publishes them.
        unsafe { ptr::write(self.trades[tail as usize].get(), *trade) };
        self.tail.store(next, Ordering::Release);
        true
    }

    /// Remove the oldest trade, or `None` when the ring is empty.
    ///
    /// Consumer side only.
    pub fn pop(&self) -> Option<Trade> {
        let head = self.head.load(Ordering::Relaxed);
        if head == self.tail.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: the acquire load of `tail` above synchronizes with the
        // producer's release store, so this slot is fully written and
        // owned by the consumer until the release store below.
        let trade = unsafe { ptr::read(self.trades[head as usize].get()) };
        self.head
            .store((head + 1) % RING_SLOTS as u32, Ordering::Release);
        Some(trade)
    }

    /// Number of trades currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire) as usize;
        let tail = self.tail.load(Ordering::Acquire) as usize;
        (tail + RING_SLOTS - head) % RING_SLOTS
    }

    /// Whether the ring holds no trades.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
