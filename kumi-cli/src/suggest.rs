//! "Did you mean" suggestions.

use strsim::levenshtein;

/// A suggestion candidate: its display name plus any other names it answers to.
pub struct Candidate<'a> {
    pub name: &'a str,
    pub aliases: &'a [String],
}

/// Closest candidate within `max_distance` edits.
///
/// A candidate's distance is the smallest over its name and aliases. Ties go
/// to the earliest candidate, so registration order decides. The candidate's
/// name is returned even when an alias matched.
pub fn suggest<'a>(
    input: &str,
    candidates: impl IntoIterator<Item = Candidate<'a>>,
    max_distance: usize,
    case_sensitive: bool,
) -> Option<&'a str> {
    let normalize = |s: &str| {
        if case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };
    let input = normalize(input);

    let mut best: Option<(usize, &'a str)> = None;
    for candidate in candidates {
        let distance = std::iter::once(candidate.name)
            .chain(candidate.aliases.iter().map(String::as_str))
            .map(|name| levenshtein(&input, &normalize(name)))
            .min()
            .unwrap_or(usize::MAX);
        if distance > max_distance {
            continue;
        }
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, candidate.name));
        }
    }
    best.map(|(_, name)| name)
}
