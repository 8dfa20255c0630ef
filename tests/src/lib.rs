//! # Discovery-Ledger Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks for the hot paths
//! └── src/integration/  # cross-crate flows through a fully wired node
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dl-tests
//! cargo test -p dl-tests integration::audit
//! cargo bench -p dl-tests
//! ```

pub mod integration;
