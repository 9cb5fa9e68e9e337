//! Wire framing.

/// Prefix of every data line.
pub const DATA_PREFIX: &str = "data: ";

/// Payload of the terminal frame.
pub const DONE: &str = "[DONE]";

/// Strip one leading `data: ` and every trailing `\r`.
///
/// A line with or without the prefix yields the same payload.
#[must_use]
pub fn normalize_line(line: &str) -> &str {
    line.strip_prefix(DATA_PREFIX)
        .unwrap_or(line)
        .trim_end_matches('\r')
}

/// Encode a payload as one frame.
#[must_use]
pub fn format_frame(payload: &str) -> String {
    let mut frame = String::with_capacity(DATA_PREFIX.len() + payload.len() + 2);
    frame.push_str(DATA_PREFIX);
    frame.push_str(payload);
    frame.push_str("\n\n");
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_line("data: {\"a\":1}"), "{\"a\":1}");
        assert_eq!(normalize_line("{\"a\":1}\r\r"), "{\"a\":1}");
        assert_eq!(normalize_line("data: x\r"), "x");
        assert_eq!(normalize_line(""), "");
    }

    #[test]
    fn test_normalize_strips_one_prefix_only() {
        assert_eq!(normalize_line("data: data: x"), "data: x");
    }

    #[test]
    fn test_format() {
        assert_eq!(format_frame(DONE), "data: [DONE]\n\n");
        assert_eq!(format_frame(""), "data: \n\n");
    }
}
