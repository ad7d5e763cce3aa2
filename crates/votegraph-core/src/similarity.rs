//! Jaro-Winkler string similarity over normalised titles.
//!
//! Strings are compared as sequences of `char`s, so Thai combining marks count
//! as their own positions, the same as the source titles are stored.

use crate::config::SimilarityConfig;
use crate::normalize::normalize_title;

/// Jaro similarity in `[0, 1]`.
///
/// Matching window is `floor(max(len) / 2) - 1`; transpositions are counted by
/// walking both match sets left to right. Either side empty yields 0.
pub fn jaro(s: &str, t: &str) -> f64 {
    if s.is_empty() || t.is_empty() {
        return 0.0;
    }
    if s == t {
        return 1.0;
    }

    let s: Vec<char> = s.chars().collect();
    let t: Vec<char> = t.chars().collect();
    let (len1, len2) = (s.len(), t.len());
    let match_dist = (len1.max(len2) / 2) as isize - 1;

    let mut s_matches = vec![false; len1];
    let mut t_matches = vec![false; len2];
    let mut matches = 0usize;

    for i in 0..len1 {
        let start = (i as isize - match_dist).max(0) as usize;
        let end = (i as isize + match_dist + 1).clamp(0, len2 as isize) as usize;
        for j in start..end {
            if t_matches[j] || s[i] != t[j] {
                continue;
            }
            s_matches[i] = true;
            t_matches[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut k = 0;
    let mut transpositions = 0usize;
    for i in 0..len1 {
        if !s_matches[i] {
            continue;
        }
        while !t_matches[k] {
            k += 1;
        }
        if s[i] != t[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let half_transpositions = transpositions as f64 / 2.0;
    (m / len1 as f64 + m / len2 as f64 + (m - half_transpositions) / m) / 3.0
}

/// Jaro similarity boosted by the length of the common prefix (capped at
/// `max_prefix` chars), scaled by `prefix_scale`.
pub fn jaro_winkler(s: &str, t: &str, prefix_scale: f64, max_prefix: usize) -> f64 {
    let js = jaro(s, t);
    if js == 0.0 {
        return 0.0;
    }
    let prefix = s
        .chars()
        .zip(t.chars())
        .take(max_prefix)
        .take_while(|(a, b)| a == b)
        .count();
    (js + prefix as f64 * prefix_scale * (1.0 - js)).min(1.0)
}

/// Similarity of two already-normalised strings with the default Winkler
/// parameters (scale 0.1, prefix up to 4 chars).
pub fn similarity(a: &str, b: &str) -> f64 {
    similarity_with(a, b, &SimilarityConfig::default())
}

pub fn similarity_with(a: &str, b: &str, config: &SimilarityConfig) -> f64 {
    jaro_winkler(a, b, config.prefix_scale, config.max_prefix)
}

/// Normalise both titles and score them. Returns 0 when either normalises to
/// the empty string.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_title(a);
    let b = normalize_title(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    similarity(&a, &b)
}
