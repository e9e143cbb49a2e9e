/// Kinds of separators text can be split on, from the coarsest to the finest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SplitTokenType {
    /// "\n\n\n"
    Section,
    /// "\n\n"
    Paragraph,
    /// "\n"
    Line,
    /// One ASCII whitespace character.
    Word,
    Char,
}

impl SplitTokenType {
    const ALL: [SplitTokenType; 5] = [
        SplitTokenType::Section,
        SplitTokenType::Paragraph,
        SplitTokenType::Line,
        SplitTokenType::Word,
        SplitTokenType::Char,
    ];

    /// Size in bytes of the separator that follows a token of this type.
    fn jump_size(self) -> usize {
        match self {
            SplitTokenType::Section => 3,
            SplitTokenType::Paragraph => 2,
            SplitTokenType::Line | SplitTokenType::Word => 1,
            SplitTokenType::Char => 0,
        }
    }

    /// Size in bytes of the token at the start of `text`.
    /// Zero if `text` starts with a separator.
    fn next_token_len(self, text: &str) -> usize {
        match self {
            SplitTokenType::Section => text.find("\n\n\n").unwrap_or(text.len()),
            SplitTokenType::Paragraph => text.find("\n\n").unwrap_or(text.len()),
            SplitTokenType::Line => text.find('\n').unwrap_or(text.len()),
            SplitTokenType::Word => text
                .find(|x| char::is_ascii_whitespace(&x))
                .unwrap_or(text.len()),
            SplitTokenType::Char => text.chars().next().map_or(0, char::len_utf8),
        }
    }
}

/// Iterator that splits text into pieces, all of which are at most a specified size.
///
/// Splits by sections (separated by 3 newlines), then by paragraphs (2 newlines),
/// then by lines (1 newline), then by word (ASCII whitespace), then character by character,
/// until it fits. Leading and trailing whitespace of every piece is dropped.
pub struct SplitOverLengthTokens<'a> {
    data: &'a str,
    max_len: usize,
}

impl<'a> SplitOverLengthTokens<'a> {
    /// Create a new splitter with specified max length by bytes.
    ///
    /// # Panics
    /// Panics if a max length of less than 4 is specified.
    /// It may be impossible to output data at such lengths due to
    /// characters being up to 4 bytes in size.
    #[must_use]
    pub fn new(data: &'a str, max_len: usize) -> SplitOverLengthTokens<'a> {
        assert!(max_len >= 4, "Max length is too small");
        SplitOverLengthTokens { data, max_len }
    }
}

impl<'a> Iterator for SplitOverLengthTokens<'a> {
    type Item = &'a str;
    fn next(&mut self) -> Option<Self::Item> {
        let data = self.data.trim_start();
        if data.is_empty() {
            self.data = data;
            return None;
        }

        if data.len() <= self.max_len {
            self.data = &data[data.len()..];
            return Some(data.trim_end());
        }

        // The biggest token type whose first token fits.
        let split_type = SplitTokenType::ALL
            .into_iter()
            .find(|x| x.next_token_len(data) <= self.max_len)
            .unwrap_or(SplitTokenType::Char);

        let mut end = split_type.next_token_len(data);
        while end < data.len() {
            let jump = split_type.jump_size();
            let rest = &data[end..];
            // A run of separators shorter than the full separator, like
            // trailing newlines, is stepped over one character at a time.
            let jump = if rest.len() >= jump && rest.is_char_boundary(jump) {
                jump
            } else {
                rest.chars().next().map_or(rest.len(), char::len_utf8)
            };
            let next_end = end + jump + split_type.next_token_len(&data[end + jump..]);
            if next_end > self.max_len {
                break;
            }
            end = next_end;
        }

        self.data = &data[end..];
        Some(data[..end].trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::SplitOverLengthTokens;

    #[test]
    fn word_split() {
        let data = "hi hello hi   HELLO!!!";
        assert_eq!(data.len(), 22);
        let mut splitter = SplitOverLengthTokens::new(data, 22);
        assert_eq!(splitter.next(), Some(data));
        assert_eq!(splitter.next(), None);

        let mut splitter = SplitOverLengthTokens::new(data, 21);
        assert_eq!(splitter.next(), Some("hi hello hi"));
        assert_eq!(splitter.next(), Some("HELLO!!!"));
        assert_eq!(splitter.next(), None);
    }

    #[test]
    fn word_and_char_split() {
        let data = "12345 123456 1234567 123 123456";
        let mut splitter = SplitOverLengthTokens::new(data, 6);
        assert_eq!(splitter.next(), Some("12345"));
        assert_eq!(splitter.next(), Some("123456"));
        assert_eq!(splitter.next(), Some("123456"));
        assert_eq!(splitter.next(), Some("7 123"));
        assert_eq!(splitter.next(), Some("123456"));
        assert_eq!(splitter.next(), None);
    }

    #[test]
    fn line_word_char_splits() {
        let data = "12345 12345\n12345\n12\n12\n1234567";
        let mut splitter = SplitOverLengthTokens::new(data, 6);
        assert_eq!(splitter.next(), Some("12345"));
        assert_eq!(splitter.next(), Some("12345"));
        assert_eq!(splitter.next(), Some("12345"));
        assert_eq!(splitter.next(), Some("12\n12"));
        assert_eq!(splitter.next(), Some("123456"));
        assert_eq!(splitter.next(), Some("7"));
        assert_eq!(splitter.next(), None);
    }

    #[test]
    fn paragraphs_stay_whole() {
        let data = "first paragraph\n\nsecond one\n\nthird";
        let pieces: Vec<_> = SplitOverLengthTokens::new(data, 28).collect();
        assert_eq!(pieces, vec!["first paragraph\n\nsecond one", "third"]);
    }

    #[test]
    fn multibyte_chars_are_not_cut() {
        let data = "✔✔✔✔✔";
        let pieces: Vec<_> = SplitOverLengthTokens::new(data, 7).collect();
        assert_eq!(pieces, vec!["✔✔", "✔✔", "✔"]);
    }
}
