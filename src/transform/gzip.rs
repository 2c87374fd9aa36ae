use super::{Transform, TransformError};
use flate2::{Compression, write::GzEncoder};
use std::io::Write;

/// `gzip` transform.
///
/// The header carries no file name and a zero mtime, so the same input always
/// compresses to the same bytes.
pub struct Gzip {
    level: Compression,
}

impl Gzip {
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Transform for Gzip {
    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(input.len() / 2), self.level);
        encoder.write_all(input)?;
        Ok(encoder.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_gzip_decompresses_to_input() {
        let input = br#"{"title": "Titre", "play": "Jouer"}"#.repeat(20);
        let compressed = Gzip::new(9).apply(&input).unwrap();

        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
        assert!(compressed.len() < input.len());
        assert_eq!(gunzip(&compressed), input);
    }

    #[test]
    fn test_gzip_is_deterministic() {
        let gzip = Gzip::new(6);
        assert_eq!(gzip.apply(b"same").unwrap(), gzip.apply(b"same").unwrap());
    }

    #[test]
    fn test_gzip_level_is_clamped() {
        let compressed = Gzip::new(42).apply(b"abc").unwrap();
        assert_eq!(gunzip(&compressed), b"abc");
    }
}
