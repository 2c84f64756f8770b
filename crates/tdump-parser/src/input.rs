//! Raw input decoding: gzip sniffing and inflation.

use std::borrow::Cow;
use std::io::Read;

use flate2::read::MultiGzDecoder;
use tdump_core::{Error, Result};
use tracing::debug;

/// Leading two bytes of a gzip member
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Inflate gzip-framed input; anything else is borrowed unchanged.
pub fn decode(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
    if !is_gzip(bytes) {
        return Ok(Cow::Borrowed(bytes));
    }

    let mut inflated = Vec::with_capacity(bytes.len() * 4);
    MultiGzDecoder::new(bytes)
        .read_to_end(&mut inflated)
        .map_err(|e| Error::decompress(e.to_string()))?;
    debug!(
        "Inflated gzip input: {} -> {} bytes",
        bytes.len(),
        inflated.len()
    );
    Ok(Cow::Owned(inflated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_plain_input_is_borrowed() {
        let decoded = decode(b"Full thread dump").unwrap();
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(&*decoded, b"Full thread dump");
    }

    #[test]
    fn test_gzip_input_is_inflated() {
        let packed = gzip(b"Full thread dump");
        assert!(is_gzip(&packed));
        let decoded = decode(&packed).unwrap();
        assert_eq!(&*decoded, b"Full thread dump");
    }

    #[test]
    fn test_corrupt_gzip_is_error() {
        let err = decode(&[0x1f, 0x8b, 0x00, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, Error::Decompress { .. }));
    }

    #[test]
    fn test_short_input_is_not_gzip() {
        assert!(!is_gzip(&[0x1f]));
        assert!(!is_gzip(&[]));
    }
}
