//! In-memory reshaping of query results.

mod series;
pub mod stopwords;
mod words;

pub use series::pivot_series;
pub use stopwords::{is_stopword, Stopwords};
pub use words::{top_n_or_default, WordCounter, DEFAULT_TOP_WORDS};
