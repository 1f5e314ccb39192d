//! URL values and everything that operates on them.
//!
//! - `parser` / `validate`: forgiving string parsing and component checks
//! - `value`: [`UrlValue`] getters, mutators and serialization
//! - `query`: the multi-value query-string codec
//! - `compare`: loose and root-domain equality

mod compare;
pub(crate) mod parser;
pub mod query;
pub mod validate;
pub mod value;

pub use query::{build_query_string, parse_query_string, QueryMap, QueryValue};
pub use validate::{is_ip_literal, validate_component, validate_scheme};
pub use value::UrlValue;
