#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Property-based test suite entry point.
//!
//! Run with:
//!
//! ```bash
//! cargo test --test property --features testutils
//! ```
//!
//! To increase the number of generated cases:
//!
//! ```bash
//! PROPTEST_CASES=512 cargo test --test property --features testutils
//! ```

mod state_machine;
