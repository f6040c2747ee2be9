use bytes::Bytes;

use crate::frame::{Frame, DOUBLE_EMPTY_OBJECT, EMPTY_OBJECT};

/// Locate the last complete, non-trivial `{...}` span in `buf`.
///
/// Returns `None` when the buffer holds no such span.
pub fn scan(buf: &[u8]) -> Option<Frame> {
    Scanner::new().scan(buf)
}

/// Like [`scan`], but yields the [`EMPTY_OBJECT`] sentinel when no frame is
/// found instead of `None`.
pub fn scan_or_sentinel(buf: &[u8]) -> Bytes {
    scan(buf)
        .map(|frame| frame.payload)
        .unwrap_or_else(|| Bytes::from_static(EMPTY_OBJECT.as_bytes()))
}

/// Brace-depth state machine.
///
/// Only `{` and `}` are significant. Braces inside quoted strings are counted
/// like any other, so `{"a":"}"}` closes early. State is reset at the start of
/// every [`Scanner::scan`]; a span cut off by the end of a chunk is lost.
#[derive(Debug, Default)]
pub struct Scanner {
    depth: usize,
    start: Option<usize>,
}

impl Scanner {
    /// Create a scanner with zero depth.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan one buffer and return its last valid candidate.
    pub fn scan(&mut self, buf: &[u8]) -> Option<Frame> {
        self.reset();

        let mut last: Option<&[u8]> = None;

        for (i, &byte) in buf.iter().enumerate() {
            match byte {
                b'{' => {
                    if self.depth == 0 {
                        self.start = Some(i);
                    }
                    self.depth += 1;
                }
                b'}' => {
                    // Unmatched closer: ignore rather than underflow.
                    if self.depth == 0 {
                        continue;
                    }
                    self.depth -= 1;
                    if self.depth == 0 {
                        if let Some(start) = self.start.take() {
                            let candidate = buf[start..=i].trim_ascii();
                            if !is_trivial(candidate) {
                                last = Some(candidate);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        last.map(|span| Frame::new(Bytes::copy_from_slice(span)))
    }

    fn reset(&mut self) {
        self.depth = 0;
        self.start = None;
    }
}

fn is_trivial(candidate: &[u8]) -> bool {
    candidate == EMPTY_OBJECT.as_bytes() || candidate == DOUBLE_EMPTY_OBJECT.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_str(input: &str) -> Option<String> {
        scan(input.as_bytes()).map(|frame| frame.to_text().into_owned())
    }

    #[test]
    fn no_braces_yields_nothing() {
        assert_eq!(scan_str(""), None);
        assert_eq!(scan_str("plain noise without objects"), None);
        assert_eq!(scan_str("\r\n\0\0"), None);
    }

    #[test]
    fn no_balanced_span_never_returns_partial() {
        assert_eq!(scan_str("{\"a\":1"), None);
        assert_eq!(scan_str("\"a\":1}"), None);
        assert_eq!(scan_str("{{\"a\":1}"), None);
    }

    #[test]
    fn single_span_returned_exactly() {
        assert_eq!(scan_str("{\"temp\":21.5}"), Some("{\"temp\":21.5}".into()));
        assert_eq!(
            scan_str("  \n{\"temp\":21.5}\r\n"),
            Some("{\"temp\":21.5}".into())
        );
    }

    #[test]
    fn last_of_many_spans_wins() {
        assert_eq!(
            scan_str("noise{\"a\":1}moretext{\"b\":2}tail"),
            Some("{\"b\":2}".into())
        );
        assert_eq!(
            scan_str("{\"seq\":1}{\"seq\":2}{\"seq\":3}"),
            Some("{\"seq\":3}".into())
        );
    }

    #[test]
    fn empty_objects_are_noise() {
        assert_eq!(scan_str("{}"), None);
        assert_eq!(scan_str("{{}}"), None);
        assert_eq!(scan_str("{} {{}} {}"), None);
        assert_eq!(scan_str("{}{\"x\":5}"), Some("{\"x\":5}".into()));
    }

    #[test]
    fn empty_object_after_valid_span_does_not_replace_it() {
        assert_eq!(scan_str("{\"x\":5}{}"), Some("{\"x\":5}".into()));
        assert_eq!(scan_str("{\"x\":5}{{}}"), Some("{\"x\":5}".into()));
    }

    #[test]
    fn nested_spans_return_outermost() {
        assert_eq!(
            scan_str("xx{\"a\":{\"b\":{\"c\":1}}}yy"),
            Some("{\"a\":{\"b\":{\"c\":1}}}".into())
        );
    }

    #[test]
    fn unmatched_closers_are_ignored() {
        assert_eq!(scan_str("}}}{\"a\":1}"), Some("{\"a\":1}".into()));
        assert_eq!(scan_str("{\"a\":1}}}}"), Some("{\"a\":1}".into()));
        assert_eq!(scan_str("}{\"a\":1}}{\"b\":2}"), Some("{\"b\":2}".into()));
    }

    #[test]
    fn trailing_open_brace_produces_no_candidate() {
        assert_eq!(scan_str("{\"a\":1}{\"b\":"), Some("{\"a\":1}".into()));

        let mut scanner = Scanner::new();
        assert!(scanner.scan(b"{\"b\":{").is_none());

        // The next scan starts clean: the leading closer is unmatched, not a
        // continuation of the open span.
        let frame = scanner.scan(b"}{\"c\":3}").unwrap();
        assert_eq!(frame.as_bytes(), b"{\"c\":3}");
    }

    #[test]
    fn braces_in_strings_are_structural() {
        // Known limitation: no string awareness.
        assert_eq!(scan_str("{\"a\":\"}\"}"), Some("{\"a\":\"}".into()));
    }

    #[test]
    fn whitespace_only_object_is_not_trivial() {
        assert_eq!(scan_str("{ }"), Some("{ }".into()));
    }

    #[test]
    fn invalid_utf8_around_span_is_tolerated() {
        let mut buf = vec![0xFF, 0xFE, 0x00];
        buf.extend_from_slice(b"{\"ok\":true}");
        buf.push(0x80);

        let frame = scan(&buf).unwrap();
        assert_eq!(frame.as_bytes(), b"{\"ok\":true}");
    }

    #[test]
    fn sentinel_returned_when_nothing_found() {
        assert_eq!(scan_or_sentinel(b"garbage").as_ref(), b"{}");
        assert_eq!(scan_or_sentinel(b"{}").as_ref(), b"{}");
        assert_eq!(scan_or_sentinel(b"{\"v\":1}").as_ref(), b"{\"v\":1}");
    }
}
