//! Text counters used for paste statistics.

/// Number of lines: newline count plus one
pub fn count_lines(s: &str) -> usize {
    s.matches('\n').count() + 1
}

/// Number of words separated by spaces, `\r` or `\n`
pub fn count_words(s: &str) -> usize {
    s.split([' ', '\r', '\n'])
        .filter(|w| !w.is_empty())
        .count()
}

/// UTF-8 encoded size
pub fn byte_len(s: &str) -> usize {
    s.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(""), 1);
        assert_eq!(count_lines("one"), 1);
        assert_eq!(count_lines("one\ntwo\n"), 3);
        assert_eq!(count_lines("a\r\nb"), 2);
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("fn main() {\r\n    println!();\n}"), 5);
        assert_eq!(count_words("tab\tseparated"), 1);
    }

    #[test]
    fn test_byte_len_is_utf8() {
        assert_eq!(byte_len("abc"), 3);
        assert_eq!(byte_len("日本"), 6);
    }
}
