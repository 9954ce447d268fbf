mod cancel;
pub mod core;
mod executor;

pub use self::cancel::Cancellation;
pub use self::core::Database;
pub use self::executor::{Cell, QueryExecutor, Row};
