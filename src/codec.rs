//! Deflate compression over arbitrary byte slices.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Error, Result};

pub fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(|_| Error::CorruptObject)?;
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"some-readme content, repeated a bit to exercise deflate a little".repeat(4);
        let compressed = compress(&data).unwrap();
        assert_ne!(compressed, data);
        let back = decompress(&compressed).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn empty_round_trip() {
        let compressed = compress(&[]).unwrap();
        let back = decompress(&compressed).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn garbage_fails_to_decompress() {
        assert!(decompress(b"not a zlib stream").is_err());
    }
}
