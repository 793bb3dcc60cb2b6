//! Candidate selection policy shared by the category and product resolvers.
//!
//! Given the candidates an upstream search returned:
//! 1. a candidate whose name equals the request (case-insensitive) wins,
//!    even if others were returned;
//! 2. otherwise a single candidate is accepted as a partial match;
//! 3. otherwise the request is ambiguous (or there was nothing to pick).

/// Outcome of [`select_candidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a, T> {
    /// No candidates at all.
    Empty,
    /// A candidate satisfied the exact-match predicate.
    Exact(&'a T),
    /// No exact match, but only one candidate was returned.
    SoleCandidate(&'a T),
    /// No exact match and more than one candidate.
    Ambiguous(&'a [T]),
}

impl<'a, T> Selection<'a, T> {
    /// The chosen candidate, if the policy picked one.
    pub fn chosen(&self) -> Option<&'a T> {
        match *self {
            Selection::Exact(c) | Selection::SoleCandidate(c) => Some(c),
            Selection::Empty | Selection::Ambiguous(_) => None,
        }
    }
}

/// Apply the exact / sole-candidate / ambiguous policy.
///
/// The first candidate satisfying `is_exact` is returned, in upstream order.
pub fn select_candidate<T, F>(candidates: &[T], is_exact: F) -> Selection<'_, T>
where
    F: Fn(&T) -> bool,
{
    if candidates.is_empty() {
        return Selection::Empty;
    }
    if let Some(exact) = candidates.iter().find(|c| is_exact(c)) {
        return Selection::Exact(exact);
    }
    match candidates {
        [only] => Selection::SoleCandidate(only),
        _ => Selection::Ambiguous(candidates),
    }
}

/// Case-insensitive name equality used for exact matches.
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
