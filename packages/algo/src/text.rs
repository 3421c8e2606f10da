//! Concept Name Helpers
//!
//! Slug generation, title casing and fuzzy name similarity used to turn free
//! text into stable concept keys.

use serde::{Deserialize, Serialize};

/// Key used when a name contains no alphanumeric characters at all
pub const PLACEHOLDER_KEY: &str = "untitled_concept";

/// Default similarity a key must reach to count as a fuzzy match
pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.7;

/// Lowercase, collapse every non-alphanumeric run into `_`, trim underscores.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        PLACEHOLDER_KEY.to_string()
    } else {
        slug
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Matching-blocks similarity `2·M / (|a| + |b|)` in [0, 1]
///
/// M is the number of characters covered by the longest common block of the
/// two strings plus, recursively, the blocks found to its left and right.
/// Two empty strings are identical (1.0).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_chars(&a, &b);
    2.0 * matched as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_block(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]` as (start_a, start_b, len)
fn longest_block(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            curr[col] = if a[i] == b[j] { prev[col - 1] + 1 } else { 0 };
            if curr[col] > best_size {
                best_size = curr[col];
                best_i = i + 1 - best_size;
                best_j = j + 1 - best_size;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
        curr.iter_mut().for_each(|v| *v = 0);
    }
    (best_i, best_j, best_size)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuzzyMatch {
    pub key: String,
    pub score: f64,
    /// How many candidates cleared the cutoff
    pub contenders: usize,
}

/// Best candidate whose case-insensitive similarity to `query` is at least `cutoff`
///
/// Each candidate is scored as `similarity(candidate, query)`; the order matters
/// because matching blocks are found left to right in the first argument. The
/// highest score wins and equal scores go to the lexicographically largest key.
pub fn best_match<'a, I>(query: &str, candidates: I, cutoff: f64) -> Option<FuzzyMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = query.to_lowercase();
    let mut best: Option<(f64, &str)> = None;
    let mut contenders = 0;

    for candidate in candidates {
        let score = similarity(&candidate.to_lowercase(), &query);
        if score < cutoff {
            continue;
        }
        contenders += 1;
        let better = match best {
            None => true,
            Some((best_score, best_key)) => {
                score > best_score || (score == best_score && candidate > best_key)
            }
        };
        if better {
            best = Some((score, candidate));
        }
    }

    best.map(|(score, key)| FuzzyMatch {
        key: key.to_string(),
        score,
        contenders,
    })
}
