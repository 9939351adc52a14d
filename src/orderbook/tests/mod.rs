//! Unit tests for the order book, close enough to the internals to
//! check structural invariants directly.
