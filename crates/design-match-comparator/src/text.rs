pub const DEFAULT_TEXT_MATCH_THRESHOLD: f64 = 80.0;

/// Fuzzy, case-insensitive string comparison scored in `[0, 100]`.
#[derive(Debug, Clone, Copy)]
pub struct TextComparator {
    threshold: f64,
}

impl Default for TextComparator {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_MATCH_THRESHOLD)
    }
}

impl TextComparator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn compare(&self, reference: &str, actual: &str) -> f64 {
        fuzzy_ratio(&normalize(reference), &normalize(actual))
    }

    pub fn is_match(&self, score: f64) -> bool {
        score >= self.threshold
    }
}

/// Lowercases and collapses whitespace runs into single spaces.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Indel similarity `100 * (1 - distance / (len_a + len_b))`, rounded to
/// the nearest integer. Two empty strings are identical.
pub fn fuzzy_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let lcs = longest_common_subsequence(&a, &b);
    let distance = total - 2 * lcs;
    (100.0 * (1.0 - distance as f64 / total as f64)).round()
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
