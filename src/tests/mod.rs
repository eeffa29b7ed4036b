//! Cross-module tests.
//!
//! Unit tests live next to the code they cover; this tree holds tests that
//! span modules: the REST client against a mock HTTP server, and the login
//! pipeline's merge/backfill flow over realistic storage snapshots.

mod login_flow_tests;
