//! Natural-language queries over stored invoices.

pub mod intent;
pub mod resolver;

pub use intent::{QueryIntent, TimeWindow};
pub use resolver::QueryResolver;
