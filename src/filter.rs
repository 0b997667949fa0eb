use std::collections::HashMap;

/// A tag/label filter: a mapping from key to allowed values.
///
/// An empty value list means "any value of this key matches".
pub type TagFilter = HashMap<String, Vec<String>>;

/// Returns true if the given key-value pairs match the given inclusion and
/// exclusion filters.
///
/// A candidate is included when `inclusion` is absent, or at least one of its
/// key-value pairs matches an inclusion rule. It is excluded when `exclusion`
/// is present and at least one of its key-value pairs matches an exclusion
/// rule. The final decision is included AND NOT excluded, so exclusion always
/// wins over inclusion.
pub fn matches_filters(
    kv: &HashMap<String, String>,
    inclusion: Option<&TagFilter>,
    exclusion: Option<&TagFilter>,
) -> bool {
    pairs_match_filters(
        kv.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        inclusion,
        exclusion,
    )
}

/// Variant of [`matches_filters`] taking key-value pairs instead of a map.
///
/// A resource may carry duplicate keys (multi-valued tags); any one matching
/// pair decides its side of the filter.
pub fn pairs_match_filters<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)> + Clone,
    inclusion: Option<&TagFilter>,
    exclusion: Option<&TagFilter>,
) -> bool {
    let mut included = inclusion.is_none();

    if let Some(inclusion) = inclusion {
        for (key, value) in pairs.clone() {
            if kv_matches_filter(key, value, inclusion) {
                included = true;
                break;
            }
        }
    }
    if !included {
        return false;
    }

    if let Some(exclusion) = exclusion {
        for (key, value) in pairs {
            if kv_matches_filter(key, value, exclusion) {
                return false;
            }
        }
    }

    true
}

/// Returns true if a single key-value pair matches a filter of key-value options.
fn kv_matches_filter(key: &str, value: &str, filter: &TagFilter) -> bool {
    match filter.get(key) {
        // an empty list of allowed values means "match any value of the key"
        Some(allowed) => allowed.is_empty() || allowed.iter().any(|v| v == value),
        None => false,
    }
}
