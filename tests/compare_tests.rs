//! Tests for loose URL equality and root-domain equality.

mod common;

use common::parse;
use psurl::UrlValue;

#[test]
fn test_compare() {
    let test_cases = vec![
        ("http://www.foo.com", "https://foo.com", true),
        ("http://www.foo.com/a", "http://www.foo.com/b", false),
        ("http://foo.com/A?X=1", "http://FOO.com/a?x=1#ignored", true),
        ("http://foo.com/?a=1", "http://foo.com/?a=1&b=2", true),
        ("http://foo.com/?a=1&b=2", "http://foo.com/?a=1", false),
        ("http://foo.com/?t=1&t=2", "http://www.foo.com/?t=1&t=2", true),
        ("http://foo.com/?t=1&t=2", "http://foo.com/?t=2&t=1", false),
        ("ftp://foo.com/", "http://foo.com/", false),
        ("http://foo.com/", "http://bar.com/", false),
        ("http://a.foo.com/", "http://www.a.foo.com/", true),
    ];

    for (a, b, expected) in test_cases {
        assert_eq!(parse(a).compare(b), expected, "compare({}, {})", a, b);
    }
}

#[test]
fn test_compare_accepts_values() {
    let a = parse("http://www.foo.com/x?y=1");
    let b = parse("https://foo.com/x?y=1&z=2");
    assert!(a.compare(&b));
    assert!(!b.compare(&a));
}

#[test]
fn test_compare_never_fails_on_garbage() {
    let a = parse("http://foo.com/");
    assert!(!a.compare("http://"));
    assert!(!a.compare("::::"));
    assert!(!UrlValue::new().compare("http://foo.com/"));
}

#[test]
fn test_compare_root_domain() {
    let test_cases = vec![
        ("foo.bar.com", "baz.bar.com", false, true),
        ("foo.bar.com", "barr.com", false, false),
        ("foo.bar.com", "http://bar.com/path", false, true),
        ("foo.bar.com", "foo.bar.com", true, true),
        ("foo.bar.com", "baz.bar.com", true, false),
        ("a.example.co.uk", "b.example.co.uk", false, true),
        ("a.example.co.uk", "a.example.org.uk", false, false),
        ("x.foo.kawasaki.jp", "y.bar.kawasaki.jp", false, false),
        ("x.city.kawasaki.jp", "y.city.kawasaki.jp", false, true),
        ("a.intranet.test", "b.intranet.test", false, false),
    ];

    for (a, b, require_subdomain_match, expected) in test_cases {
        assert_eq!(
            parse(a).compare_root_domain(b, require_subdomain_match),
            expected,
            "compare_root_domain({}, {}, {})",
            a,
            b,
            require_subdomain_match
        );
    }
}

#[test]
fn test_compare_root_domain_with_values() {
    let a = parse("https://shop.example.com/cart");
    let b = parse("http://blog.example.com/");
    assert!(a.compare_root_domain(&b, false));
    assert!(!a.compare_root_domain(&b, true));
    assert!(!a.compare_root_domain(&UrlValue::new(), false));
}
