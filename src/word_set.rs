//! Fixed-vocabulary membership tests for word rules
//!
//! A [`WordSet`] is built once from a list of words and never mutated, so
//! it is safe to share across concurrent readers. Lookup uses a chained
//! hash table whose bucket count equals the vocabulary size, with a
//! left-shift/add polynomial hash over character codes.
//!
//! Candidates longer than the longest registered word are rejected in
//! O(1) before hashing. The pre-check uses the raw (unfolded) length of
//! the query; case folding can change a string's length in some scripts,
//! so in principle a query could be rejected that would match after
//! folding. This is a known, intentionally preserved approximation.

/// Immutable membership test over a fixed vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSet {
    buckets: Vec<Vec<String>>,
    max_length: usize,
    case_sensitive: bool,
}

impl WordSet {
    /// Build a word set from a vocabulary
    ///
    /// Case-insensitive sets fold the stored words once at construction;
    /// queries are folded per lookup.
    pub fn new<I, S>(words: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stored: Vec<String> = words
            .into_iter()
            .map(|w| {
                if case_sensitive {
                    w.as_ref().to_owned()
                } else {
                    fold(w.as_ref())
                }
            })
            .collect();
        let bucket_count = stored.len().max(1);
        let mut buckets = vec![Vec::new(); bucket_count];
        let mut max_length = 0;
        for word in stored {
            let length = word.chars().count();
            if length > max_length {
                max_length = length;
            }
            let index = (hash_code(&word) % bucket_count as u64) as usize;
            buckets[index].push(word);
        }
        Self {
            buckets,
            max_length,
            case_sensitive,
        }
    }

    /// Check whether `text` is a registered word
    pub fn find(&self, text: &str) -> bool {
        // length pre-check on the raw query, before any folding
        if text.chars().count() > self.max_length {
            return false;
        }
        let candidate;
        let query = if self.case_sensitive {
            text
        } else {
            candidate = fold(text);
            &candidate
        };
        let index = (hash_code(query) % self.buckets.len() as u64) as usize;
        self.buckets[index].iter().any(|w| w == query)
    }

    /// Length of the longest registered word, in character units
    #[inline]
    pub fn maximum_length(&self) -> usize {
        self.max_length
    }

    /// Check whether matching is case sensitive
    #[inline]
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }
}

/// Left-shift/add polynomial hash over character codes
#[inline]
fn hash_code(text: &str) -> u64 {
    let mut h: u64 = 0;
    for ch in text.chars() {
        h = h.wrapping_mul(2).wrapping_add(ch as u64);
    }
    h
}

/// Simple case fold: full lowercase expansion per character
fn fold(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_sensitive_lookup() {
        let set = WordSet::new(["if", "else", "while"], true);
        assert!(set.find("if"));
        assert!(set.find("while"));
        assert!(!set.find("If"));
        assert!(!set.find("IF"));
        assert!(!set.find("ifx"));
        assert!(!set.find(""));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let set = WordSet::new(["Select", "FROM"], false);
        assert!(set.find("select"));
        assert!(set.find("SELECT"));
        assert!(set.find("sElEcT"));
        assert!(set.find("from"));
        assert!(!set.find("where"));
    }

    #[test]
    fn test_length_precheck() {
        let set = WordSet::new(["a", "bb"], true);
        assert_eq!(set.maximum_length(), 2);
        assert!(!set.find("ccc"));
        assert!(set.find("bb"));
    }

    #[test]
    fn test_empty_vocabulary() {
        let set = WordSet::new(Vec::<String>::new(), true);
        assert!(!set.find("anything"));
        assert!(!set.find(""));
    }

    #[test]
    fn test_collisions_resolved_by_chaining() {
        // Many words, few distinct hash residues: chains must still find
        // every member exactly.
        let words: Vec<String> = (0..64).map(|i| format!("w{i}")).collect();
        let set = WordSet::new(&words, true);
        for w in &words {
            assert!(set.find(w), "missing {w}");
        }
        assert!(!set.find("w64"));
    }
}
