/*! Integration tests for ysync.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - path: Tests for path splitting and structured keys
 * - coerce: Tests for scalar coercion through the public API
 * - navigate: Tests for single-step child access on typed and dynamic values
 * - sync: Tests for event application, overrides, batches and the journal
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ysync=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod coerce;
mod helpers;
mod navigate;
mod path;
mod sync;
