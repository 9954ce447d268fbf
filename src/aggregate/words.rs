use indexmap::IndexMap;

use super::stopwords::Stopwords;
use crate::models::WordCount;

/// Default and fallback size of a most-common-words listing.
pub const DEFAULT_TOP_WORDS: usize = 20;

/// Running word tally fed one word array at a time.
///
/// Words are counted by their raw text, so differently cased spellings are
/// distinct entries. Stopwords are matched case-insensitively.
pub struct WordCounter<'a> {
    stopwords: &'a Stopwords,
    counts: IndexMap<String, u64>,
}

impl<'a> WordCounter<'a> {
    pub fn new(stopwords: &'a Stopwords) -> Self {
        WordCounter {
            stopwords,
            counts: IndexMap::new(),
        }
    }

    pub fn add_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        for word in words.into_iter().flatten() {
            let word = word.as_ref();
            if word.is_empty() || self.stopwords.contains(word) {
                continue;
            }
            match self.counts.get_mut(word) {
                Some(count) => *count += 1,
                None => {
                    self.counts.insert(word.to_string(), 1);
                }
            }
        }
    }

    /// Words seen at least twice, most frequent first, at most `n` of them.
    /// Equal counts keep first-seen order.
    pub fn top(self, n: usize) -> Vec<WordCount> {
        let mut ranked: Vec<WordCount> = self
            .counts
            .into_iter()
            .filter(|(_, count)| *count >= 2)
            .map(|(word, count)| WordCount { word, count })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(n);
        ranked
    }
}

/// Coerce a caller-supplied top-N: missing, non-numeric or non-positive
/// values become [`DEFAULT_TOP_WORDS`].
pub fn top_n_or_default(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_TOP_WORDS)
}
