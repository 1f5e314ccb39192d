//! Query-string codec preserving repeated keys and unusual key spellings.
//!
//! Decoding differs from form decoders in two ways: keys are kept exactly as
//! written (dots, spaces and stray brackets survive), and a bare key seen more
//! than once collects its values into a list instead of keeping the last one.

use std::borrow::Cow;

/// A decoded query value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Single occurrence, or an empty value for a key without `=`.
    Str(String),
    /// A bare key repeated several times, values in encounter order.
    List(Vec<String>),
    /// Explicit bracket syntax (`a[b]=1`, `a[]=1`).
    Map(QueryMap),
}

impl QueryValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            QueryValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&QueryMap> {
        match self {
            QueryValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::List(values)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(values: Vec<&str>) -> Self {
        QueryValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<QueryMap> for QueryValue {
    fn from(map: QueryMap) -> Self {
        QueryValue::Map(map)
    }
}

/// Insertion-ordered map of query keys to values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryMap {
    entries: Vec<(String, QueryValue)>,
}

impl QueryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut QueryValue> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Option<QueryValue> {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Next implicit index for `key[]`: one past the largest integer key.
    fn next_index(&self) -> u64 {
        self.keys()
            .filter_map(|k| k.parse::<u64>().ok())
            .max()
            .map_or(0, |max| max + 1)
    }
}

impl<K, V> FromIterator<(K, V)> for QueryMap
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = QueryMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Decode a query string (without the leading `?`).
///
/// # Examples
///
/// ```
/// use psurl::{parse_query_string, QueryValue};
///
/// let map = parse_query_string("foo=bar&foo=baz&something=else", "&");
/// assert_eq!(map.get("foo"), Some(&QueryValue::from(vec!["bar", "baz"])));
/// assert_eq!(map.get("something"), Some(&QueryValue::from("else")));
/// ```
pub fn parse_query_string(query: &str, separator: &str) -> QueryMap {
    let mut map = QueryMap::new();
    if query.is_empty() || separator.is_empty() {
        return map;
    }

    for component in query.split(separator) {
        if component.is_empty() {
            continue;
        }

        let (raw_key, raw_value) = component.split_once('=').unwrap_or((component, ""));
        let key = decode_component(raw_key);
        if key.is_empty() {
            continue;
        }
        let value = decode_component(raw_value);

        match split_brackets(&key) {
            Some((base, path)) => insert_indexed(&mut map, base, &path, value),
            None => insert_bare(&mut map, key, value),
        }
    }

    map
}

/// Encode a map into a query string joined by `separator`.
///
/// Empty values produce a bare key, lists repeat the key, and nested maps
/// produce bracketed keys.
pub fn build_query_string(map: &QueryMap, separator: &str) -> String {
    let mut pairs = Vec::new();
    for (key, value) in map.iter() {
        push_pairs(&mut pairs, key.to_string(), value);
    }
    pairs.join(separator)
}

fn push_pairs(pairs: &mut Vec<String>, key: String, value: &QueryValue) {
    match value {
        QueryValue::Str(v) => pairs.push(encode_pair(&key, v)),
        QueryValue::List(values) => pairs.extend(values.iter().map(|v| encode_pair(&key, v))),
        QueryValue::Map(nested) => {
            for (sub, v) in nested.iter() {
                push_pairs(pairs, format!("{}[{}]", key, sub), v);
            }
        }
    }
}

fn encode_pair(key: &str, value: &str) -> String {
    if value.is_empty() {
        urlencoding::encode(key).into_owned()
    } else {
        format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
    }
}

/// Percent-decode with `+` as space; invalid UTF-8 is replaced, not dropped.
fn decode_component(raw: &str) -> String {
    let spaced: Cow<'_, str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };

    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned(),
    }
}

/// Split `a[b][]` into `("a", ["b", ""])`.
///
/// Returns `None` unless everything after the base is a well-formed chain of
/// bracket groups, so keys like `a[b`, `a]b` or `a[b]c` stay literal.
fn split_brackets(key: &str) -> Option<(&str, Vec<String>)> {
    let open = key.find('[')?;
    if open == 0 {
        return None;
    }

    let (base, mut rest) = key.split_at(open);
    let mut path = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        let segment = &inner[..close];
        if segment.contains('[') {
            return None;
        }
        path.push(segment.to_string());
        rest = &inner[close + 1..];
    }

    Some((base, path))
}

fn insert_bare(map: &mut QueryMap, key: String, value: String) {
    match map.get_mut(&key) {
        Some(QueryValue::Str(first)) => {
            let first = std::mem::take(first);
            map.insert(key, QueryValue::List(vec![first, value]));
        }
        Some(QueryValue::List(values)) => values.push(value),
        // a bare key after bracketed ones replaces them
        Some(slot) => *slot = QueryValue::Str(value),
        None => {
            map.insert(key, QueryValue::Str(value));
        }
    }
}

fn insert_indexed(map: &mut QueryMap, base: &str, path: &[String], value: String) {
    if !matches!(map.get(base), Some(QueryValue::Map(_))) {
        map.insert(base, QueryValue::Map(QueryMap::new()));
    }
    if let Some(QueryValue::Map(nested)) = map.get_mut(base) {
        insert_path(nested, path, value);
    }
}

fn insert_path(target: &mut QueryMap, path: &[String], value: String) {
    let Some((head, tail)) = path.split_first() else {
        return;
    };
    let segment = if head.is_empty() {
        target.next_index().to_string()
    } else {
        head.clone()
    };

    if tail.is_empty() {
        target.insert(segment, QueryValue::Str(value));
        return;
    }

    if !matches!(target.get(&segment), Some(QueryValue::Map(_))) {
        target.insert(segment.clone(), QueryValue::Map(QueryMap::new()));
    }
    if let Some(QueryValue::Map(child)) = target.get_mut(&segment) {
        insert_path(child, tail, value);
    }
}
