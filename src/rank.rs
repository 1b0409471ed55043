/// How well a candidate name matches a typed query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum MatchTier {
    Exact,
    Prefix,
    Substring,
}

/// Case-insensitive tier of `candidate` against `query`, or `None` for a non-match.
///
/// An empty query is a prefix of everything.
pub(crate) fn match_tier(candidate: &str, query: &str) -> Option<MatchTier> {
    let candidate = candidate.to_lowercase();
    let query = query.to_lowercase();
    if candidate == query {
        Some(MatchTier::Exact)
    } else if candidate.starts_with(&query) {
        Some(MatchTier::Prefix)
    } else if candidate.contains(&query) {
        Some(MatchTier::Substring)
    } else {
        None
    }
}

/// Keep the candidates matching `query`, best tier first.
///
/// The sort is stable, so candidates within a tier keep their input order.
pub(crate) fn rank_by<T, F>(candidates: impl IntoIterator<Item = T>, query: &str, name: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut scored: Vec<(MatchTier, T)> = candidates
        .into_iter()
        .filter_map(|candidate| match_tier(name(&candidate), query).map(|tier| (tier, candidate)))
        .collect();
    scored.sort_by_key(|(tier, _)| *tier);
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}
