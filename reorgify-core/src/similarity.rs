use serde::{Deserialize, Serialize};
use similar::TextDiff;

/// The gate's decision trail for one structural match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub parent: String,
    pub candidate: String,
    pub similarity: f64,
    pub accepted: bool,
}

/// Threshold gate over [`name_similarity`].
///
/// A threshold of `0.0` disables gating entirely: every candidate is
/// accepted regardless of its score.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityGate {
    threshold: f64,
}

impl SimilarityGate {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// A gate that accepts everything.
    pub fn disabled() -> Self {
        Self { threshold: 0.0 }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn check(&self, parent: &str, candidate: &str) -> MatchResult {
        let similarity = name_similarity(parent, candidate);
        let accepted = self.threshold == 0.0 || similarity >= self.threshold;
        MatchResult {
            parent: parent.to_string(),
            candidate: candidate.to_string(),
            similarity,
            accepted,
        }
    }
}

/// Score the similarity of two names in [0, 1].
///
/// Extensions are stripped when a name looks like a filename, case is
/// folded, and the score is the best longest-matching-blocks ratio of the
/// shorter name against any equal-length window of the longer one. This
/// keeps wrapper names with release-tag decorations (`Foo` vs `Foo_v2`,
/// `Movie (2020)` vs `Movie.zip`) scoring high while unrelated names stay
/// near zero.
///
/// `name_similarity("", x) == 0.0` for every `x`; the function is symmetric.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    // Canonical argument order keeps the score exactly symmetric.
    let (ca, cb) = (a.chars().count(), b.chars().count());
    let (short, long) = if ca < cb || (ca == cb && a <= b) {
        (&a, &b)
    } else {
        (&b, &a)
    };

    let mut best = char_ratio(short, long);
    let long_chars: Vec<char> = long.chars().collect();
    let width = short.chars().count();
    for start in 0..=(long_chars.len() - width) {
        let window: String = long_chars[start..start + width].iter().collect();
        best = best.max(char_ratio(short, &window));
        if best >= 1.0 {
            break;
        }
    }
    best
}

fn char_ratio(a: &str, b: &str) -> f64 {
    f64::from(TextDiff::from_chars(a, b).ratio())
}

fn normalize(name: &str) -> String {
    strip_extension(name.trim()).to_lowercase()
}

/// Drop a trailing `.ext` when the string looks like a filename: a nonempty
/// stem followed by a short alphanumeric suffix.
fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 4
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        },
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identity_is_one() {
        assert_eq!(name_similarity("Foo", "Foo"), 1.0);
        assert_eq!(name_similarity("Movie (2020)", "Movie (2020)"), 1.0);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(name_similarity("", "anything"), 0.0);
        assert_eq!(name_similarity("anything", ""), 0.0);
        assert_eq!(name_similarity("", ""), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let ab = name_similarity("Foo", "Foo_v2");
        let ba = name_similarity("Foo_v2", "Foo");
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_suffixed_name_scores_high() {
        assert!(name_similarity("Foo", "Foo_v2") > 0.8);
    }

    #[test]
    fn test_unrelated_name_scores_low() {
        assert!(name_similarity("Foo", "Bar") < 0.8);
    }

    #[test]
    fn test_extension_stripped_for_filenames() {
        // "Movie.zip" compares as "movie" against "movie (2020)".
        assert!(name_similarity("Movie (2020)", "Movie.zip") >= 0.5);
        // A long suffix is not treated as an extension.
        assert_eq!(strip_extension("name.torrent"), "name.torrent");
        assert_eq!(strip_extension(".hidden"), ".hidden");
    }

    #[test]
    fn test_gate_threshold() {
        let gate = SimilarityGate::new(0.8);
        assert!(gate.check("Foo", "Foo_v2").accepted);
        let rejected = gate.check("Foo", "Bar");
        assert!(!rejected.accepted);
        assert!(rejected.similarity < 0.8);
    }

    #[test]
    fn test_zero_threshold_accepts_everything() {
        let gate = SimilarityGate::disabled();
        let m = gate.check("Foo", "Bar");
        assert!(m.accepted);
        assert!(m.similarity < 0.8);
    }

    #[test]
    fn test_threshold_clamped() {
        assert_eq!(SimilarityGate::new(7.0).threshold(), 1.0);
        assert_eq!(SimilarityGate::new(-1.0).threshold(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_similarity_in_unit_range(a in ".{0,24}", b in ".{0,24}") {
            let s = name_similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&s));
        }

        #[test]
        fn prop_similarity_symmetric(a in ".{0,24}", b in ".{0,24}") {
            prop_assert_eq!(name_similarity(&a, &b), name_similarity(&b, &a));
        }
    }
}
