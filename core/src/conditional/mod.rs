// hookline/src/conditional/mod.rs

//! Conditional execution of steps.
//!
//! Each step is guarded by a query filter evaluated against the context's
//! current item. Filter operands may be templates that refer back to fields
//! of the same item, which allows conditions such as "run only if `a`
//! equals `b`".

pub mod matcher;
pub mod path;
pub mod query;
pub mod template;

pub use matcher::{Predicate, PredicateMatcher, SKIP_FIELD};
pub use path::FieldPath;
pub use query::{Filter, FilterError};
pub use template::Template;
