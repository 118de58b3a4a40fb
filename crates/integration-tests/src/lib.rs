//! Integration tests for the store locator.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the server against a scratch database
//! cargo run -p store-locator-cli -- migrate
//! cargo run -p store-locator
//!
//! # Run the ignored integration tests
//! cargo test -p store-locator-integration-tests -- --ignored
//! ```
//!
//! The server address is read from `LOCATOR_BASE_URL`
//! (default `http://localhost:3000`).
