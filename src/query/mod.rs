mod builder;
mod keyword;
pub mod sql;

pub use builder::{BuiltQuery, Filters, QueryArg, SqlBuilder};
pub use keyword::{sanitize_keyword, sanitize_keywords};
