//! Integration tests exercising the crate through its public API.

mod engine_tests;
mod feed_tests;
mod transport_tests;
