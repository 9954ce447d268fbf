use std::collections::{BTreeMap, BTreeSet};

use crate::models::{GroupedCount, SentimentClass, SeriesResult};

/// Pivot grouped counts into three series aligned to the sorted group keys.
///
/// Every key present in the input gets a slot, including keys whose rows all
/// carry an unrecognised class. Repeated (key, class) pairs are summed.
pub fn pivot_series(rows: &[GroupedCount]) -> SeriesResult {
    let mut keys = BTreeSet::new();
    let mut negative: BTreeMap<&str, i64> = BTreeMap::new();
    let mut neutral: BTreeMap<&str, i64> = BTreeMap::new();
    let mut positive: BTreeMap<&str, i64> = BTreeMap::new();

    for row in rows {
        let key = row.group_by.as_str();
        keys.insert(key);

        let bucket = match SentimentClass::parse(&row.sentiment_key) {
            Some(SentimentClass::Negative) => &mut negative,
            Some(SentimentClass::Neutral) => &mut neutral,
            Some(SentimentClass::Positive) => &mut positive,
            None => continue,
        };
        *bucket.entry(key).or_default() += row.count;
    }

    let lookup = |series: &BTreeMap<&str, i64>| -> Vec<i64> {
        keys.iter()
            .map(|k| series.get(k).copied().unwrap_or(0))
            .collect()
    };

    SeriesResult {
        negative: lookup(&negative),
        neutral: lookup(&neutral),
        positive: lookup(&positive),
        keys: keys.iter().map(|k| k.to_string()).collect(),
    }
}
