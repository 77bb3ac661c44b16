//! Text helpers shared by the lowering backends.

pub mod chunk;
pub mod entities;
pub mod interleave;

pub use chunk::{Segment, chunk_text};
pub use entities::{decode, decode_entities};
pub use interleave::interleave;

/// Length of `s` in UTF-16 code units, the unit Google Docs indexes by.
pub fn doc_len(s: &str) -> usize {
    s.encode_utf16().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_len_counts_utf16_units() {
        assert_eq!(doc_len("abc"), 3);
        assert_eq!(doc_len("é"), 1);
        // Outside the BMP: one char, a surrogate pair.
        assert_eq!(doc_len("😀"), 2);
    }
}
