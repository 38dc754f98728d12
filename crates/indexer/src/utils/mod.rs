pub mod concurrency;

pub use concurrency::run_with_concurrency_collect;
