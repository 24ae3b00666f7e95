use tracing::debug;

use crate::fragment::ConfigFragment;

use super::filter::FragmentFilter;
use super::resolved::ResolvedConfig;

/// Folds the fragments whose id equals `id` (or all of them when `id` is
/// `None`) into one configuration.
///
/// Returns `None` when nothing matched; that is not an error.
pub fn resolve(fragments: &[ConfigFragment], id: Option<&str>) -> Option<ResolvedConfig> {
    resolve_with(fragments, &FragmentFilter::from(id))
}

/// Scalars: the last matching fragment that sets a field wins, field by
/// field. Lists: concatenated in input order.
pub fn resolve_with(fragments: &[ConfigFragment], filter: &FragmentFilter) -> Option<ResolvedConfig> {
    let mut resolved: Option<ResolvedConfig> = None;

    for (index, fragment) in fragments.iter().enumerate() {
        if !filter.matches(fragment) {
            continue;
        }
        resolved
            .get_or_insert_with(ResolvedConfig::default)
            .absorb(index, fragment);
    }

    match &resolved {
        Some(cfg) => debug!(filter = ?filter, matched = cfg.matched(), "Configuration resolved"),
        None => debug!(filter = ?filter, total = fragments.len(), "No fragment matched"),
    }

    resolved
}
