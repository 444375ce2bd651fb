/// Literal prefix of an event-bearing line.
pub const FRAME_MARKER: &str = "data:";

/// What a single reassembled line means to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// Blank keep-alive, `:` comment, `event:`/`id:` field or anything else
    /// that is not a data line.
    Ignored,
    /// A data line whose payload is blank.
    Empty,
    /// Trimmed payload text of a data line.
    Data(&'a str),
}

pub fn classify(line: &str) -> Frame<'_> {
    let Some(rest) = line.strip_prefix(FRAME_MARKER) else {
        return Frame::Ignored;
    };

    let payload = collapse_markers(rest).trim();
    if payload.is_empty() {
        Frame::Empty
    } else {
        Frame::Data(payload)
    }
}

/// Strips every further marker the relay stacked in front of the payload.
///
/// `rest` is the text after the first marker. Both `data:data:` and
/// `data: data: ` collapse, however many times they repeat.
fn collapse_markers(mut rest: &str) -> &str {
    loop {
        let unspaced = rest.strip_prefix(' ').unwrap_or(rest);
        match unspaced.strip_prefix(FRAME_MARKER) {
            Some(next) => rest = next,
            None => return unspaced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_data_line() {
        assert_eq!(classify("data: {\"a\":1}"), Frame::Data("{\"a\":1}"));
        assert_eq!(classify("data:{\"a\":1}"), Frame::Data("{\"a\":1}"));
    }

    #[test]
    fn test_duplicated_marker_collapses() {
        let single = classify("data: {\"x\":true}");
        for n in 1..8 {
            let line = format!("{}{}", "data:".repeat(n), " {\"x\":true}");
            assert_eq!(classify(&line), single, "repeat count {}", n);
        }
        assert_eq!(classify("data: data: data: {\"x\":true}"), single);
    }

    #[test]
    fn test_marker_only_is_empty() {
        assert_eq!(classify("data:"), Frame::Empty);
        assert_eq!(classify("data:   "), Frame::Empty);
        assert_eq!(classify("data:data:"), Frame::Empty);
    }

    #[test]
    fn test_non_data_lines_ignored() {
        assert_eq!(classify(""), Frame::Ignored);
        assert_eq!(classify(": keep-alive"), Frame::Ignored);
        assert_eq!(classify("event: message"), Frame::Ignored);
        assert_eq!(classify(" data: {}"), Frame::Ignored);
        assert_eq!(classify("Data: {}"), Frame::Ignored);
    }

    #[test]
    fn test_payload_whitespace_trimmed() {
        assert_eq!(classify("data:   [1, 2]  \t"), Frame::Data("[1, 2]"));
    }
}
