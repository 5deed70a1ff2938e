use reqwest::Url;

use crate::error::{unexpected_error, Error};

const SEARCH_BASE: &str = "https://www.google.com/maps/search/";

/// Map search page for a free-text address.
pub fn search_url(address: &str) -> Result<Url, Error> {
    let url = format!("{}{}", SEARCH_BASE, encode_component(address.trim()));

    Url::parse(&url).map_err(|_| unexpected_error())
}

/// Escapes everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`, byte by byte
/// over the UTF-8 encoding.
fn encode_component(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());

    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }

    encoded
}

#[test]
fn search_url_test() {
    let url = search_url("Library Road North Wing").unwrap();
    assert_eq!(
        url.as_str(),
        "https://www.google.com/maps/search/Library%20Road%20North%20Wing"
    );
}

#[test]
fn search_url_escapes_separators_test() {
    let url = search_url("Science Block/1st Floor #2").unwrap();
    assert_eq!(
        url.as_str(),
        "https://www.google.com/maps/search/Science%20Block%2F1st%20Floor%20%232"
    );

    let url = search_url("Academic Block, Hall 3").unwrap();
    assert_eq!(
        url.as_str(),
        "https://www.google.com/maps/search/Academic%20Block%2C%20Hall%203"
    );

    let url = search_url("A&B; x=1+2?").unwrap();
    assert_eq!(
        url.as_str(),
        "https://www.google.com/maps/search/A%26B%3B%20x%3D1%2B2%3F"
    );
}

#[test]
fn encode_component_keeps_unreserved_test() {
    assert_eq!(encode_component("a-z_0.9!~*'()"), "a-z_0.9!~*'()");
    assert_eq!(encode_component("caf\u{e9}"), "caf%C3%A9");
}

#[test]
fn search_url_empty_address_test() {
    let url = search_url("").unwrap();
    assert_eq!(url.as_str(), "https://www.google.com/maps/search/");
}
