//! Public Suffix List loading, caching and host resolution.
//!
//! This module contains:
//! - The rule index and longest-match resolver
//! - Cache file snapshots
//! - The download transport
//! - The shared [`SuffixList`] store

pub mod cache;
pub mod fetch;
pub mod rules;
pub mod store;

pub use fetch::{FetchRequest, HttpFetcher, SuffixListFetcher};
pub use rules::{decompose, RuleIndex, TopLabelRules};
pub use store::{LoadOutcome, SuffixList};
