//! Property-based test generators using proptest.
//!
//! Provides strategies for file names, append sequences and namespaces in
//! the shapes a storage engine produces.

use proptest::prelude::*;
use std::collections::BTreeSet;

/// Strategy for generating a single path segment.
pub fn segment_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9][a-zA-Z0-9_.-]{0,15}").expect("Invalid regex")
}

/// Strategy for generating engine-style file names (`000042.log`,
/// `MANIFEST-000003`, `CURRENT`, ...).
pub fn engine_file_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..1_000_000).prop_map(|n| format!("{n:06}.log")),
        (0u32..1_000_000).prop_map(|n| format!("{n:06}.ldb")),
        (0u32..1_000_000).prop_map(|n| format!("MANIFEST-{n:06}")),
        Just("CURRENT".to_string()),
        Just("LOCK".to_string()),
        Just("LOG".to_string()),
    ]
}

/// Strategy for generating a set of distinct relative file names.
pub fn name_set_strategy(max: usize) -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(
        prop_oneof![engine_file_name_strategy(), segment_strategy()],
        0..max,
    )
}

/// Strategy for generating the payload of one append.
pub fn chunk_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

/// Strategy for generating a sequence of appends.
pub fn append_sequence_strategy(
    min_appends: usize,
    max_appends: usize,
) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(chunk_strategy(), min_appends..max_appends)
}

/// Strategy for generating object content.
pub fn content_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..max_len)
}

/// Proptest configuration shared by the environment's property tests.
///
/// Each case builds a fresh store and applier thread, so the case count is
/// kept small.
#[must_use]
pub fn env_proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 32,
        max_shrink_iters: 100,
        ..ProptestConfig::default()
    }
}
