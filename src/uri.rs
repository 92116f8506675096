//! URI detection for token rules
//!
//! [`UriDetector`] recognizes RFC 3986-shaped URIs in plain text: scheme,
//! authority (userinfo, host, port), path, query and fragment, with
//! percent-encoding. Although it follows the RFC productions, it is not a
//! validator — the grammar is deliberately approximate (IPv6 literals in
//! particular are not recognized) and restricted to ASCII.
//!
//! A detector can optionally be limited to a set of registered schemes.

use crate::error::RuleError;
use crate::word_set::WordSet;
use memchr::memchr;

/// Detects and searches URIs in text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UriDetector {
    valid_schemes: Option<WordSet>,
}

impl UriDetector {
    /// Create a detector accepting any syntactically valid scheme
    #[inline]
    pub fn new() -> Self {
        Self {
            valid_schemes: None,
        }
    }

    /// Restrict the detector to the given schemes
    ///
    /// Fails with [`RuleError::InvalidArgument`] if any entry is not a
    /// valid scheme name. Scheme comparison is case-insensitive.
    pub fn set_valid_schemes<I, S>(&mut self, schemes: I) -> Result<&mut Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        for scheme in schemes {
            let s = scheme.as_ref();
            let bytes = s.as_bytes();
            if eat_scheme(bytes, 0) != Some(bytes.len()) || bytes.is_empty() {
                return Err(RuleError::invalid_argument(format!(
                    "{s:?} is not a valid URI scheme"
                )));
            }
            names.push(s.to_owned());
        }
        self.valid_schemes = Some(WordSet::new(names, false));
        Ok(self)
    }

    /// Length of the URI starting at the beginning of `text`, if any
    pub fn detect(&self, text: &str) -> Option<usize> {
        let bytes = text.as_bytes();
        if bytes.len() < 2 {
            return None;
        }

        // locate the scheme terminator
        let search_end = match &self.valid_schemes {
            Some(set) => bytes.len().min(1 + set.maximum_length() + 1),
            None => bytes.len(),
        };
        let colon = 1 + memchr(b':', &bytes[1..search_end])?;
        if eat_scheme(bytes, 0) != Some(colon) {
            return None;
        }
        if let Some(set) = &self.valid_schemes {
            if !set.find(&text[..colon]) {
                return None;
            }
        }
        if colon == bytes.len() - 1 {
            // terminated with an empty path
            return Some(bytes.len());
        }

        let mut i = eat_hier_part(bytes, colon + 1);
        if i < bytes.len() && bytes[i] == b'?' {
            i = eat_query(bytes, i + 1);
        }
        if i < bytes.len() && bytes[i] == b'#' {
            i = eat_fragment(bytes, i + 1);
        }
        Some(i)
    }

    /// Find the first URI anywhere in `text`
    ///
    /// Returns the half-open `(start, end)` offsets of the match.
    pub fn search(&self, text: &str) -> Option<(usize, usize)> {
        let bytes = text.as_bytes();
        let mut from = 0;
        while from + 1 < bytes.len() {
            let colon = from + memchr(b':', &bytes[from..])?;
            if colon == 0 {
                from = 1;
                continue;
            }
            for start in from..colon {
                if eat_scheme(bytes, start) != Some(colon) {
                    continue;
                }
                if let Some(set) = &self.valid_schemes {
                    if !set.find(&text[start..colon]) {
                        continue;
                    }
                }
                if let Some(length) = self.detect(&text[start..]) {
                    return Some((start, start + length));
                }
            }
            from = colon + 1;
        }
        None
    }
}

// Each production takes the byte slice and a start index and returns the
// end of the parsed sequence. Productions marked nullable return the
// start index itself when nothing matched.

#[inline]
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

#[inline]
fn is_sub_delim(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
    )
}

// pct-encoded = "%" HEXDIG HEXDIG
fn eat_pct_encoded(bytes: &[u8], i: usize) -> Option<usize> {
    if i + 2 < bytes.len()
        && bytes[i] == b'%'
        && bytes[i + 1].is_ascii_hexdigit()
        && bytes[i + 2].is_ascii_hexdigit()
    {
        Some(i + 3)
    } else {
        None
    }
}

// scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn eat_scheme(bytes: &[u8], i: usize) -> Option<usize> {
    if i >= bytes.len() || !bytes[i].is_ascii_alphabetic() {
        return None;
    }
    let mut j = i + 1;
    while j < bytes.len()
        && (bytes[j].is_ascii_alphanumeric() || matches!(bytes[j], b'+' | b'-' | b'.'))
    {
        j += 1;
    }
    Some(j)
}

// pchar = unreserved / pct-encoded / sub-delims / ":" / "@"
fn eat_pchar(bytes: &[u8], i: usize) -> Option<usize> {
    if i >= bytes.len() {
        return None;
    }
    if is_unreserved(bytes[i]) || is_sub_delim(bytes[i]) || matches!(bytes[i], b':' | b'@') {
        return Some(i + 1);
    }
    eat_pct_encoded(bytes, i)
}

// segment = *pchar [nullable]
fn eat_segment(bytes: &[u8], mut i: usize) -> usize {
    while let Some(j) = eat_pchar(bytes, i) {
        i = j;
    }
    i
}

// userinfo = *( unreserved / pct-encoded / sub-delims / ":" ) [nullable]
fn eat_userinfo(bytes: &[u8], mut i: usize) -> usize {
    loop {
        if i < bytes.len() && (is_unreserved(bytes[i]) || is_sub_delim(bytes[i]) || bytes[i] == b':')
        {
            i += 1;
        } else if let Some(j) = eat_pct_encoded(bytes, i) {
            i = j;
        } else {
            return i;
        }
    }
}

// dec-octet = "25" %x30-35 / "2" %x30-34 DIGIT / "1" 2DIGIT
//           / %x31-39 DIGIT / DIGIT
fn eat_dec_octet(bytes: &[u8], i: usize) -> Option<usize> {
    match &bytes[i.min(bytes.len())..] {
        [b'2', b'5', b'0'..=b'5', ..] => Some(i + 3),
        [b'2', b'0'..=b'4', b'0'..=b'9', ..] => Some(i + 3),
        [b'1', b'0'..=b'9', b'0'..=b'9', ..] => Some(i + 3),
        [b'1'..=b'9', b'0'..=b'9', ..] => Some(i + 2),
        [b'0'..=b'9', ..] => Some(i + 1),
        _ => None,
    }
}

// IPv4address = dec-octet "." dec-octet "." dec-octet "." dec-octet
fn eat_ipv4(bytes: &[u8], i: usize) -> Option<usize> {
    let mut j = eat_dec_octet(bytes, i)?;
    for _ in 0..3 {
        if j >= bytes.len() || bytes[j] != b'.' {
            return None;
        }
        j = eat_dec_octet(bytes, j + 1)?;
    }
    Some(j)
}

// IPvFuture = "v" 1*HEXDIG "." 1*( unreserved / sub-delims / ":" ),
// wrapped in brackets as IP-literal. IPv6 literals are not recognized.
fn eat_ip_literal(bytes: &[u8], i: usize) -> Option<usize> {
    if i >= bytes.len() || bytes[i] != b'[' {
        return None;
    }
    let mut j = i + 1;
    if j >= bytes.len() || bytes[j] != b'v' {
        return None;
    }
    j += 1;
    let hex_start = j;
    while j < bytes.len() && bytes[j].is_ascii_hexdigit() {
        j += 1;
    }
    if j == hex_start || j >= bytes.len() || bytes[j] != b'.' {
        return None;
    }
    j += 1;
    let tail_start = j;
    while j < bytes.len() && (is_unreserved(bytes[j]) || is_sub_delim(bytes[j]) || bytes[j] == b':')
    {
        j += 1;
    }
    if j == tail_start || j >= bytes.len() || bytes[j] != b']' {
        return None;
    }
    Some(j + 1)
}

// reg-name = *( unreserved / pct-encoded / sub-delims ) [nullable]
fn eat_reg_name(bytes: &[u8], mut i: usize) -> usize {
    loop {
        if i < bytes.len() && (is_unreserved(bytes[i]) || is_sub_delim(bytes[i])) {
            i += 1;
        } else if let Some(j) = eat_pct_encoded(bytes, i) {
            i = j;
        } else {
            return i;
        }
    }
}

// host = IP-literal / IPv4address / reg-name [nullable]
fn eat_host(bytes: &[u8], i: usize) -> usize {
    if let Some(j) = eat_ip_literal(bytes, i) {
        return j;
    }
    if let Some(j) = eat_ipv4(bytes, i) {
        return j;
    }
    eat_reg_name(bytes, i)
}

// authority = [ userinfo "@" ] host [ ":" port ] [nullable]
fn eat_authority(bytes: &[u8], i: usize) -> usize {
    let after_userinfo = eat_userinfo(bytes, i);
    let mut j = if after_userinfo < bytes.len() && bytes[after_userinfo] == b'@' {
        eat_host(bytes, after_userinfo + 1)
    } else {
        eat_host(bytes, i)
    };
    if j < bytes.len() && bytes[j] == b':' {
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
    }
    j
}

// path-abempty = *( "/" segment ) [nullable]
fn eat_path_abempty(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] == b'/' {
        i = eat_segment(bytes, i + 1);
    }
    i
}

// hier-part = "//" authority path-abempty / path-absolute / path-rootless
//           / path-empty [nullable]
fn eat_hier_part(bytes: &[u8], i: usize) -> usize {
    if bytes[i..].starts_with(b"//") {
        let j = eat_authority(bytes, i + 2);
        return eat_path_abempty(bytes, j);
    }
    if i < bytes.len() && bytes[i] == b'/' {
        // path-absolute = "/" [ segment-nz *( "/" segment ) ]
        let j = eat_segment(bytes, i + 1);
        if j > i + 1 {
            return eat_path_abempty(bytes, j);
        }
        return i + 1;
    }
    // path-rootless = segment-nz *( "/" segment )
    let j = eat_segment(bytes, i);
    if j > i {
        return eat_path_abempty(bytes, j);
    }
    // path-empty
    i
}

// query = fragment = *( pchar / "/" / "?" ) [nullable]
fn eat_query(bytes: &[u8], mut i: usize) -> usize {
    loop {
        if i < bytes.len() && matches!(bytes[i], b'/' | b'?') {
            i += 1;
        } else if let Some(j) = eat_pchar(bytes, i) {
            i = j;
        } else {
            return i;
        }
    }
}

fn eat_fragment(bytes: &[u8], i: usize) -> usize {
    eat_query(bytes, i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_simple_url() {
        let d = UriDetector::new();
        assert_eq!(d.detect("http://example.com/"), Some(19));
        assert_eq!(d.detect("https://example.com/a/b?q=1#frag rest"), Some(32));
        assert_eq!(d.detect("mailto:user@example.com and"), Some(23));
    }

    #[test]
    fn test_detect_requires_leading_scheme() {
        let d = UriDetector::new();
        assert_eq!(d.detect("see http://example.com"), None);
        assert_eq!(d.detect("no uri here"), None);
        assert_eq!(d.detect(""), None);
        assert_eq!(d.detect(":"), None);
    }

    #[test]
    fn test_detect_stops_at_invalid_characters() {
        let d = UriDetector::new();
        // the space terminates the URI
        let text = "http://example.com/path more";
        assert_eq!(d.detect(text), Some("http://example.com/path".len()));
    }

    #[test]
    fn test_detect_with_port_and_userinfo() {
        let d = UriDetector::new();
        let text = "ftp://user:pw@host.example:2121/dir";
        assert_eq!(d.detect(text), Some(text.len()));
    }

    #[test]
    fn test_detect_ipv4_host() {
        let d = UriDetector::new();
        let text = "http://192.168.0.1:8080/x";
        assert_eq!(d.detect(text), Some(text.len()));
    }

    #[test]
    fn test_valid_schemes_restriction() {
        let mut d = UriDetector::new();
        d.set_valid_schemes(["http", "https"]).unwrap();
        assert!(d.detect("http://example.com").is_some());
        assert!(d.detect("ftp://example.com").is_none());
        // scheme match is case-insensitive
        assert!(d.detect("HTTP://example.com").is_some());
    }

    #[test]
    fn test_invalid_scheme_rejected_at_configuration() {
        let mut d = UriDetector::new();
        let err = d.set_valid_schemes(["not a scheme"]).unwrap_err();
        assert!(matches!(err, RuleError::InvalidArgument { .. }));
        assert!(d.set_valid_schemes(["1http"]).is_err());
    }

    #[test]
    fn test_search_finds_embedded_uri() {
        let d = UriDetector::new();
        let text = "docs at https://example.com/x, see there";
        let (start, end) = d.search(text).unwrap();
        assert_eq!(&text[start..end], "https://example.com/x,");
        assert_eq!(d.search("nothing here"), None);
    }

    #[test]
    fn test_pct_encoding_and_octets() {
        assert_eq!(eat_pct_encoded(b"%2Fx", 0), Some(3));
        assert_eq!(eat_pct_encoded(b"%2", 0), None);
        assert_eq!(eat_pct_encoded(b"%ZZ", 0), None);
        assert_eq!(eat_dec_octet(b"255", 0), Some(3));
        assert_eq!(eat_dec_octet(b"256", 0), Some(2));
        assert_eq!(eat_dec_octet(b"x", 0), None);
        assert_eq!(eat_ipv4(b"10.0.0.1", 0), Some(8));
        assert_eq!(eat_ipv4(b"10.0.0", 0), None);
    }
}
