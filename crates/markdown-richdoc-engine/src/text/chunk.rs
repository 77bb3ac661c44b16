use super::interleave;

/// A piece of chunked text: literal content or an explicit line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Newline,
}

impl Segment {
    /// The literal text this segment stands for.
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Newline => "\n",
        }
    }
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Lines are chunked independently and re-joined with [`Segment::Newline`]
/// markers, so concatenating every segment's [`Segment::as_str`] gives back
/// `text`. Empty lines produce no text segment. Splits only fall on
/// `char` boundaries; a `max_chars` of zero is treated as one.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<Segment> {
    let max_chars = max_chars.max(1);
    let lines = text
        .split('\n')
        .map(|line| {
            split_line(line, max_chars)
                .into_iter()
                .map(Segment::Text)
                .collect::<Vec<_>>()
        })
        .collect();
    interleave(lines, vec![Segment::Newline]).concat()
}

fn split_line(line: &str, max_chars: usize) -> Vec<String> {
    let mut out = vec![];
    let mut start = 0;
    let mut count = 0;
    for (i, _) in line.char_indices() {
        if count == max_chars {
            out.push(line[start..i].to_string());
            start = i;
            count = 0;
        }
        count += 1;
    }
    if start < line.len() {
        out.push(line[start..].to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Segment {
        Segment::Text(s.to_string())
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("hello", 2000), vec![text("hello")]);
    }

    #[test]
    fn long_line_splits_at_limit() {
        assert_eq!(
            chunk_text("abcdefg", 3),
            vec![text("abc"), text("def"), text("g")]
        );
    }

    #[test]
    fn newlines_become_markers() {
        assert_eq!(
            chunk_text("ab\ncd", 10),
            vec![text("ab"), Segment::Newline, text("cd")]
        );
    }

    #[test]
    fn empty_lines_yield_no_chunk() {
        assert_eq!(
            chunk_text("a\n\nb", 10),
            vec![text("a"), Segment::Newline, Segment::Newline, text("b")]
        );
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(chunk_text("", 10).is_empty());
    }

    #[test]
    fn never_splits_inside_a_character() {
        let chunks = chunk_text("😀😀😀", 2);
        assert_eq!(chunks, vec![text("😀😀"), text("😀")]);
    }

    #[test]
    fn zero_limit_is_treated_as_one() {
        assert_eq!(chunk_text("ab", 0), vec![text("a"), text("b")]);
    }

    #[test]
    fn segments_reassemble_source() {
        let source = "first line\n\nsecond, longer line\n";
        let joined: String = chunk_text(source, 4).iter().map(Segment::as_str).collect();
        assert_eq!(joined, source);
    }
}
