//! Selection of paths that end at the first public address seen from a probe.

use crate::utils::ip_utils::AddressClassifier;

use super::types::{FilteredPaths, PathKey};

/// Whether a path is usable for location inference.
///
/// The terminal address must be public and every address before it must be
/// private. Paths with a single hop only need a public terminal address.
pub fn is_first_public_hop(path: &PathKey, classifier: &dyn AddressClassifier) -> bool {
    let Some(terminal) = path.terminal() else {
        return false;
    };
    if classifier.is_private(terminal) {
        return false;
    }
    path.len() == 2
        || path
            .intermediates()
            .iter()
            .all(|addr| classifier.is_private(addr))
}

/// Keep only the paths accepted by [`is_first_public_hop`], preserving order
pub fn filter_paths<'a, I>(paths: I, classifier: &dyn AddressClassifier) -> FilteredPaths
where
    I: IntoIterator<Item = &'a PathKey>,
{
    paths
        .into_iter()
        .filter(|path| is_first_public_hop(path, classifier))
        .cloned()
        .collect()
}
