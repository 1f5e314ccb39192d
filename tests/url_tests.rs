//! Tests for URL parsing, serialization and component mutation.

mod common;

use common::{fixture_list, parse};
use psurl::*;

#[test]
fn test_serialization_is_stable_under_reparse() {
    let inputs = vec![
        "http://www.some-website.com/some-path?a=b",
        "  example.com  ",
        "HTTPS://Example.COM:8443/A/B.html?x=1&x=2#Frag",
        "http://example.com?only=query",
        "http://example.com#only-fragment",
        "http://example.com/with space/and\"quotes\"?q=[1]",
        "http:\\\\example.com/path",
        "ftp://files.example.org/pub/",
        "http://127.0.0.1:8080/status",
        "http://[::1]/",
        "http://b\u{fc}cher.de/",
        "http://example.com/caf\u{e9}?n=\u{e9}",
    ];

    for input in inputs {
        let first = parse(input).to_string();
        let second = parse(&first).to_string();
        assert_eq!(first, second, "Reparse changed serialization of {:?}", input);
    }
}

#[test]
fn test_host_components() {
    let url = parse("http://www.some-website.com/some-path?a=b");
    assert_eq!(url.subdomain().unwrap(), Some("www"));
    assert_eq!(url.domain().unwrap(), Some("some-website"));
    assert_eq!(url.tld().unwrap(), Some("com"));
}

#[test]
fn test_multi_label_and_wildcard_tlds() {
    let test_cases = vec![
        ("http://a.b.example.co.uk/", Some("a.b"), "example", "co.uk"),
        ("http://example.uk/", None, "example", "uk"),
        ("http://shop.foo.kawasaki.jp/", None, "shop", "foo.kawasaki.jp"),
        ("http://a.shop.foo.kawasaki.jp/", Some("a"), "shop", "foo.kawasaki.jp"),
        ("http://www.city.kawasaki.jp/", Some("www"), "city", "kawasaki.jp"),
        ("http://x.y.ck/", None, "x", "y.ck"),
        ("http://www.ck/", None, "www", "ck"),
    ];

    for (input, subdomain, domain, tld) in test_cases {
        let url = parse(input);
        assert_eq!(url.subdomain().unwrap(), subdomain, "subdomain of {}", input);
        assert_eq!(url.domain().unwrap(), Some(domain), "domain of {}", input);
        assert_eq!(url.tld().unwrap(), Some(tld), "tld of {}", input);
    }
}

#[test]
fn test_idn_hosts() {
    let url = parse("http://\u{43f}\u{440}\u{438}\u{43c}\u{435}\u{440}.\u{440}\u{444}/");
    assert!(url.host().unwrap().is_ascii());
    assert!(url.host().unwrap().starts_with("xn--"));
    assert_eq!(url.tld().unwrap(), Some("xn--p1ai"));
    assert_eq!(url.subdomain().unwrap(), None);
}

#[test]
fn test_ip_hosts_have_no_components() {
    for input in ["http://127.0.0.1/x", "http://[2001:db8::1]:8080/"] {
        let url = parse(input);
        assert!(url.host_is_ip(), "{} should be an IP host", input);
        assert_eq!(url.subdomain(), Ok(None));
        assert_eq!(url.domain(), Ok(None));
        assert_eq!(url.tld(), Ok(None));
    }
}

#[test]
fn test_disabled_suffix_list() {
    let dir = tempfile::tempdir().unwrap();
    let config = SuffixListConfig {
        disabled: true,
        ..common::config(dir.path())
    };
    let list = std::sync::Arc::new(common::failing_list(config));

    let url = UrlValue::parse_with("http://www.example.com/", list.clone()).unwrap();
    let err = url.domain().unwrap_err();
    assert_eq!(err, UrlError::TldDisabled);
    assert!(err.is_tld_error());

    let ip = UrlValue::parse_with("http://127.0.0.1/", list).unwrap();
    assert_eq!(ip.domain(), Ok(None));
}

#[test]
fn test_rejected_urls() {
    let invalid = vec![
        "",
        "   ",
        "http://",
        "http://exa mple.com/",
        "http://-example.com/",
        "http://example..com/",
        "http://example.com:99999/",
        "http://example.com:abc/",
        "1http://example.com/",
    ];

    for input in invalid {
        let result = UrlValue::parse_with(input, fixture_list());
        assert!(
            matches!(result, Err(UrlError::InvalidArgument(_))),
            "Should reject {:?}, got {:?}",
            input,
            result
        );
    }
}

#[test]
fn test_failed_set_url_leaves_clean_state() {
    let mut url = parse("https://www.example.com:8443/a?b=c#d");
    assert!(url.set_url("http://exa mple.com/").is_err());

    assert_eq!(url.url(), "");
    assert_eq!(url.host(), None);
    assert_eq!(url.port(), None);
    assert_eq!(url.scheme(), "http");
    assert_eq!(url.query_string(), None);
    assert_eq!(url.hash_fragment(), None);
    assert_eq!(url.domain(), Ok(None));
}

#[test]
fn test_set_tld_from_simple_host() {
    let mut url = parse("http://foo.com/");
    url.set_tld("co.uk").unwrap();
    assert_eq!(url.host(), Some("foo.co.uk"));
    assert_eq!(url.domain().unwrap(), Some("foo"));
    assert_eq!(url.tld().unwrap(), Some("co.uk"));
    assert_eq!(url.subdomain().unwrap(), None);
}

#[test]
fn test_mutation_chain() {
    let mut url = parse("example.com");
    url.set_scheme("https")
        .unwrap()
        .set_port(8443)
        .unwrap()
        .set_subdomain("api")
        .unwrap()
        .set_path("/v1/items")
        .unwrap()
        .set_query_string_param("limit", "10")
        .unwrap()
        .set_hash_fragment("top")
        .unwrap();

    assert_eq!(url.url(), "https://api.example.com:8443/v1/items?limit=10#top");
    assert_eq!(url.full_host().as_deref(), Some("api.example.com:8443"));
    assert_eq!(url.full_path(), "/v1/items?limit=10#top");
    assert_eq!(url.path_base_name(), "items");
}

#[test]
fn test_set_host_drops_port() {
    let mut url = parse("http://example.com:8080/a");
    url.set_host("other.org").unwrap();
    assert_eq!(url.url(), "http://other.org/a");
    assert!(url.set_host("bad host").is_err());
}

#[test]
fn test_query_params_through_value() {
    let mut url = parse("http://example.com/search?tag=a&tag=b&q=rust");
    assert_eq!(
        url.query_string_param("tag"),
        Some(&QueryValue::from(vec!["a", "b"]))
    );

    url.set_query_string_param("tag", vec!["c"]).unwrap();
    assert_eq!(url.query_string(), Some("tag=c&q=rust"));

    url.unset_query_string_param("missing").unwrap();
    url.unset_query_string_param("q").unwrap();
    assert_eq!(url.url(), "http://example.com/search?tag=c");
}

#[test]
fn test_lower_case() {
    let mut url = parse("HTTP://WWW.EXAMPLE.COM/Path?Q=V#F");
    url.set_lower_case();
    assert_eq!(url.url(), "http://www.example.com/path?q=v#f");
    assert_eq!(url.subdomain().unwrap(), Some("www"));
}

#[test]
fn test_std_traits() {
    let url: UrlValue = "https://example.com/x".parse().unwrap();
    assert_eq!(url.to_string(), "https://example.com/x");

    let same = UrlValue::try_from("https://example.com/x").unwrap();
    assert_eq!(url, same);
    assert_ne!(url, UrlValue::default());
}

#[test]
fn test_cast() {
    let url = parse("http://example.com/");
    let passed = UrlValue::cast(&url).unwrap().unwrap();
    assert!(std::ptr::eq(passed.as_ref(), &url));

    let parsed = UrlValue::cast("example.org").unwrap().unwrap();
    assert_eq!(parsed.url(), "http://example.org/");

    assert!(UrlValue::cast("").unwrap().is_none());
    assert!(matches!(UrlValue::cast("http://a b"), Err(UrlError::InvalidArgument(_))));
}
