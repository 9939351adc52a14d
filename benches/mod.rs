use criterion::{criterion_group, criterion_main};

mod order_book;
mod transport;

use order_book::register_benchmarks as register_order_book_benchmarks;
use transport::register_benchmarks as register_transport_benchmarks;

criterion_group!(
    benches,
    register_order_book_benchmarks,
    register_transport_benchmarks,
);

criterion_main!(benches);
