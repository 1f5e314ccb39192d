//! Suffix rule index and longest-match resolution.
//!
//! Rules are grouped by their rightmost label, then by rule length, so a
//! lookup only ever scans the handful of rules sharing the host's top label.
//! Labels are kept in their written order (`["co", "uk"]` for `co.uk`).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::UrlError;
use crate::types::HostComponents;

/// Marker line after which the list holds private registrations only.
const END_ICANN_MARKER: &str = "END ICANN DOMAINS";

/// All rules sharing one rightmost label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopLabelRules {
    /// Ordinary and wildcard rules keyed by label count.
    pub by_length: BTreeMap<usize, Vec<Vec<String>>>,
    /// Exception rules with the leading `!` removed.
    pub exceptions: Vec<Vec<String>>,
}

/// In-memory index of the Public Suffix List.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleIndex {
    rules: HashMap<String, TopLabelRules>,
}

impl RuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse list text line by line.
    ///
    /// Blank lines and `//` comments are skipped, and parsing stops for good
    /// at the `END ICANN DOMAINS` marker. Anything after the first whitespace
    /// on a rule line is ignored.
    pub fn parse(text: &str) -> Self {
        let mut index = Self::new();

        for line in text.lines() {
            let line = line.trim();
            if line.contains(END_ICANN_MARKER) {
                break;
            }
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            if let Some(rule) = line.split_whitespace().next() {
                index.insert_rule(rule);
            }
        }

        index
    }

    /// Add a single rule line (`co.uk`, `*.ck`, `!www.ck`).
    pub fn insert_rule(&mut self, rule: &str) {
        let (is_exception, body) = match rule.strip_prefix('!') {
            Some(body) => (true, body),
            None => (false, rule),
        };

        let labels: Vec<String> = body.split('.').map(str::to_string).collect();
        if labels.iter().any(String::is_empty) {
            return;
        }
        let Some(top) = labels.last().cloned() else {
            return;
        };

        let bucket = self.rules.entry(top).or_default();
        if is_exception {
            bucket.exceptions.push(labels);
        } else {
            bucket.by_length.entry(labels.len()).or_default().push(labels);
        }
    }

    /// Total number of rules, exceptions included.
    pub fn len(&self) -> usize {
        self.rules
            .values()
            .map(|bucket| {
                bucket.exceptions.len() + bucket.by_length.values().map(Vec::len).sum::<usize>()
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn top_label_rules(&self, top: &str) -> Option<&TopLabelRules> {
        self.rules.get(top)
    }

    /// Number of trailing host labels that form the effective TLD.
    ///
    /// Exception rules win first: the longest matching exception yields its
    /// own length minus one. Otherwise candidate lengths are tried from the
    /// longest usable one down to a single label, and the first length with a
    /// matching rule is returned. The result always leaves at least one label
    /// for the domain.
    pub fn matching_tld_length(&self, host: &str) -> Result<usize, UrlError> {
        let labels = match_labels(host);
        if labels.iter().any(String::is_empty) {
            return Err(UrlError::no_valid_tld(host));
        }

        let bucket = labels
            .last()
            .and_then(|top| self.rules.get(top))
            .ok_or_else(|| UrlError::no_valid_tld(host))?;

        let exception = bucket
            .exceptions
            .iter()
            .filter(|rule| rule.len() <= labels.len() && rule_matches(rule, &labels))
            .map(Vec::len)
            .max();
        if let Some(length) = exception {
            return Ok(length - 1);
        }

        let longest = bucket.by_length.keys().next_back().copied().unwrap_or(0);
        let start = longest.min(labels.len() - 1);

        for length in (1..=start).rev() {
            if let Some(rules) = bucket.by_length.get(&length) {
                if rules.iter().any(|rule| rule_matches(rule, &labels)) {
                    return Ok(length);
                }
            }
        }

        Err(UrlError::no_valid_tld(host))
    }
}

/// Split a host at a known TLD length.
///
/// The TLD is the last `tld_length` labels, the domain is the label before
/// it, and whatever precedes the domain becomes the subdomain.
pub fn decompose(host: &str, tld_length: usize) -> Result<HostComponents, UrlError> {
    let labels: Vec<&str> = host.split('.').collect();
    if tld_length == 0 || tld_length >= labels.len() {
        return Err(UrlError::no_valid_tld(host));
    }

    let split = labels.len() - tld_length;
    let tld = labels[split..].join(".");
    let domain = labels[split - 1].to_string();
    let subdomain = if split > 1 {
        Some(labels[..split - 1].join("."))
    } else {
        None
    };

    Ok(HostComponents {
        subdomain,
        domain,
        tld,
    })
}

/// Host labels as compared against rules: lower-cased, with `xn--` labels
/// converted back to Unicode since the list is written in Unicode.
fn match_labels(host: &str) -> Vec<String> {
    host.split('.')
        .map(|label| {
            let lower = label.to_lowercase();
            if lower.starts_with("xn--") {
                let (unicode, result) = idna::domain_to_unicode(&lower);
                if result.is_ok() {
                    return unicode;
                }
            }
            lower
        })
        .collect()
}

/// Compare a rule against the trailing host labels of the same span.
fn rule_matches(rule: &[String], labels: &[String]) -> bool {
    if rule.len() > labels.len() {
        return false;
    }
    let tail = &labels[labels.len() - rule.len()..];
    rule.iter()
        .zip(tail)
        .all(|(expected, actual)| expected == "*" || expected == actual)
}
