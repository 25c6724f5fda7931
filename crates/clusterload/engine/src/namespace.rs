//! Namespace naming for a test run

use clusterload_types::NamespaceRange;
use rand::distributions::Alphanumeric;
use rand::Rng;

const PREFIX_LEN: usize = 6;

/// Random namespace scope for one test run, e.g. `test-k3x9qa`.
pub fn random_prefix() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(|c| (c as char).to_ascii_lowercase())
        .take(PREFIX_LEN)
        .collect();
    format!("test-{}", suffix)
}

/// Name of the `index`-th namespace under `basename`.
pub fn namespace_name(basename: &str, index: u32) -> String {
    format!("{}-{}", basename, index)
}

/// Concrete namespaces covered by a range.
///
/// No range means cluster scope, represented by a single empty namespace.
/// A range without a basename uses the run's automanaged prefix.
pub fn namespace_list(prefix: &str, range: Option<&NamespaceRange>) -> Vec<String> {
    let Some(range) = range else {
        return vec![String::new()];
    };
    let basename = range.basename.as_deref().unwrap_or(prefix);
    (range.min..=range.max)
        .map(|i| namespace_name(basename, i))
        .collect()
}
