//! Request path construction.
//!
//! This module provides the [`Query`] parameter set and the [`path`] function
//! used by every service to turn a fixed URL template into the final request
//! path sent through the [`Client`](crate::Client).

use std::{collections::BTreeMap, fmt};

use url::form_urlencoded;

/// Ordered, multi-valued set of query parameters.
///
/// Keys are kept sorted, and the values of a repeated key keep the order in
/// which they were added. The encoded form is the canonical
/// `application/x-www-form-urlencoded` representation, which is also what the
/// [`Client`](crate::Client) sends for form bodies.
///
/// # Examples
///
/// ```
/// use rbxweb::Query;
///
/// let mut query = Query::new();
/// query.add("universeIds", "189707");
/// query.add("universeIds", "292439477");
/// query.add("format", "Png");
/// assert_eq!(
///     query.encode(),
///     "format=Png&universeIds=189707&universeIds=292439477"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    values: BTreeMap<String, Vec<String>>,
}

impl Query {
    /// Create an empty [Query].
    pub fn new() -> Self {
        Query::default()
    }

    /// Append `value` to the values of `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Replace every value of `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), vec![value.into()]);
    }

    /// Append every item of `values` to `key`, formatted with [`fmt::Display`].
    ///
    /// Nothing is recorded when `values` is empty.
    pub fn extend<I, V>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        if values.is_empty() {
            return;
        }
        self.values.entry(key.into()).or_default().extend(values);
    }

    /// First value of `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value of `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty)
    }

    /// Encode the parameters as `key=value` pairs joined by `&`, sorted by key.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.values {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut query = Query::new();
        for (key, value) in iter {
            query.add(key, value);
        }
        query
    }
}

/// Build a request path from a template.
///
/// Each `{}` placeholder of `template` is replaced, in order, by the matching
/// entry of `args`. When `query` holds at least one value, its encoded form is
/// appended after a `?`.
///
/// # Panics
///
/// Panics when the number of placeholders differs from the number of `args`.
/// Templates are fixed strings owned by the services, so a mismatch is a
/// programming error.
///
/// # Examples
///
/// ```
/// use rbxweb::path::path;
///
/// assert_eq!(
///     path("universes/v1/places/{}/universe", None, &[&1818]),
///     "universes/v1/places/1818/universe"
/// );
/// ```
pub fn path(template: &str, query: Option<&Query>, args: &[&dyn fmt::Display]) -> String {
    let mut path = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(index) = rest.find("{}") {
        path.push_str(&rest[..index]);
        match args.next() {
            Some(arg) => path.push_str(&arg.to_string()),
            None => panic!("path template {template:?} has more placeholders than arguments"),
        }
        rest = &rest[index + 2..];
    }
    path.push_str(rest);

    assert!(
        args.next().is_none(),
        "path template {template:?} has fewer placeholders than arguments"
    );

    if let Some(query) = query.filter(|query| !query.is_empty()) {
        path.push('?');
        path.push_str(&query.encode());
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(path: &str) -> Vec<(String, String)> {
        let (_, query) = path.split_once('?').unwrap();
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_path_without_query() {
        assert_eq!(path("v1/games/icons", None, &[]), "v1/games/icons");
        assert_eq!(
            path("v1/games/icons", Some(&Query::new()), &[]),
            "v1/games/icons"
        );
    }

    #[test]
    fn test_path_with_repeated_keys() {
        let mut query = Query::new();
        query.extend("universeIds", [189707, 292439477]);

        assert_eq!(
            path("v1/games/icons", Some(&query), &[]),
            "v1/games/icons?universeIds=189707&universeIds=292439477"
        );
    }

    #[test]
    fn test_path_sorts_keys() {
        let query: Query = [("size", "150x150"), ("isCircular", "false"), ("format", "Png")]
            .into_iter()
            .collect();

        assert_eq!(
            path("v1/games/icons", Some(&query), &[]),
            "v1/games/icons?format=Png&isCircular=false&size=150x150"
        );
    }

    #[test]
    fn test_path_formats_arguments_before_query() {
        let query: Query = [("note", "100%")].into_iter().collect();

        assert_eq!(
            path("v2/client-version/{}/channel/{}", Some(&query), &[&"WindowsPlayer", &"live"]),
            "v2/client-version/WindowsPlayer/channel/live?note=100%25"
        );
    }

    #[test]
    fn test_path_round_trips_query() {
        let mut query = Query::new();
        query.add("b", "second value");
        query.add("a", "x&y=z");
        query.add("b", "first/value?");
        query.add("c", "ünïcode");

        let decoded = decode(&path("v1/test", Some(&query), &[]));
        assert_eq!(
            decoded,
            vec![
                ("a".to_string(), "x&y=z".to_string()),
                ("b".to_string(), "second value".to_string()),
                ("b".to_string(), "first/value?".to_string()),
                ("c".to_string(), "ünïcode".to_string()),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "more placeholders")]
    fn test_path_missing_argument_panics() {
        path("universes/v1/places/{}/universe", None, &[]);
    }

    #[test]
    #[should_panic(expected = "fewer placeholders")]
    fn test_path_extra_argument_panics() {
        path("v1/users", None, &[&1]);
    }

    #[test]
    fn test_query_accessors() {
        let mut query = Query::new();
        assert!(query.is_empty());

        query.extend("ids", Vec::<i64>::new());
        assert!(query.is_empty());
        assert!(query.get_all("ids").is_empty());

        query.add("ids", "1");
        query.add("ids", "2");
        assert_eq!(query.get("ids"), Some("1"));
        assert_eq!(query.get_all("ids"), ["1", "2"]);

        query.set("ids", "3");
        assert_eq!(query.get_all("ids"), ["3"]);
        assert_eq!(query.get("missing"), None);
    }
}
