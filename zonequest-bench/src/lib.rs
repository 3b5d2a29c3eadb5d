//! Benchmark-only crate; see `benches/lobby_store.rs`.
