//! UTF-8 decoding for the scanner pipeline.
//!
//! Glyphs are not canonical Unicode scalars: the decoder packs the raw bytes
//! of each sequence into a `u32` accumulator, shifting left by eight for
//! every continuation byte. ASCII glyphs therefore compare equal to their
//! code points, which every literal comparison downstream relies on.

/// A decoded code point in the packed byte representation.
pub type Glyph = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Error {
    /// The leading bits of the first byte do not encode a valid sequence
    /// length.
    VarlenMarkerInvalid,
    /// A continuation byte does not carry the `10xxxxxx` bit pattern.
    VarlenByteInvalid,
    /// The input ended in the middle of a multi-byte sequence.
    InputExhausted,
}

impl std::fmt::Display for Utf8Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Utf8Error::VarlenMarkerInvalid => write!(f, "invalid UTF-8 length marker"),
            Utf8Error::VarlenByteInvalid => write!(f, "invalid UTF-8 continuation byte"),
            Utf8Error::InputExhausted => write!(f, "input ended inside a UTF-8 sequence"),
        }
    }
}

/// Sequence length encoded by the first byte, or `None` for an invalid
/// marker.
fn sequence_length(b: u8) -> Option<u8> {
    if b < 0x80 {
        Some(1)
    } else if b >> 5 == 0b110 {
        Some(2)
    } else if b >> 4 == 0b1110 {
        Some(3)
    } else if b >> 3 == 0b11110 {
        Some(4)
    } else {
        None
    }
}

fn is_continuation(b: u8) -> bool {
    b >> 6 == 0b10
}

/// Streaming decoder over any byte iterator. Once an error is observed the
/// decoder is terminal: iteration yields nothing and `err` reports the
/// failure.
pub struct Decoder<I> {
    bytes: I,
    err: Option<Utf8Error>,
}

impl<I: Iterator<Item = u8>> Decoder<I> {
    pub fn new(bytes: I) -> Self {
        Decoder { bytes, err: None }
    }

    pub fn err(&self) -> Option<Utf8Error> {
        self.err
    }

    fn fail(&mut self, err: Utf8Error) -> Option<Glyph> {
        self.err = Some(err);
        None
    }
}

impl<I: Iterator<Item = u8>> Iterator for Decoder<I> {
    type Item = Glyph;

    fn next(&mut self) -> Option<Glyph> {
        if self.err.is_some() {
            return None;
        }

        let first = self.bytes.next()?;
        let len = match sequence_length(first) {
            Some(len) => len,
            None => return self.fail(Utf8Error::VarlenMarkerInvalid),
        };

        let mut glyph = Glyph::from(first);
        for _ in 1..len {
            let b = match self.bytes.next() {
                Some(b) => b,
                None => return self.fail(Utf8Error::InputExhausted),
            };
            if !is_continuation(b) {
                return self.fail(Utf8Error::VarlenByteInvalid);
            }
            glyph = (glyph << 8) | Glyph::from(b);
        }

        Some(glyph)
    }
}

/// Convenience constructor for decoding in-memory text.
pub fn decode_str(s: &str) -> Decoder<std::iter::Copied<std::slice::Iter<'_, u8>>> {
    Decoder::new(s.as_bytes().iter().copied())
}

/// Append the raw bytes of a packed glyph, most significant non-zero byte
/// first. A glyph of zero still contributes its low byte (NUL).
pub fn encode(g: Glyph, out: &mut Vec<u8>) {
    let mut i = 0;
    while i < 3 && (g >> ((3 - i) * 8)) as u8 == 0 {
        i += 1;
    }
    while i < 4 {
        out.push((g >> ((3 - i) * 8)) as u8);
        i += 1;
    }
}

/// Reassemble packed glyphs into text. Glyphs produced by [`Decoder`] from
/// well-formed input always round-trip losslessly.
pub fn to_text(glyphs: &[Glyph]) -> String {
    let mut bytes = Vec::with_capacity(glyphs.len());
    for &g in glyphs {
        encode(g, &mut bytes);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
