//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

/// Endpoint used by configuration fixtures; nothing listens on port 9.
pub const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:9/v2.1/project";

/// Token used by configuration fixtures.
pub const TEST_TOKEN: &str = "gAAAAAB-integration-token";
