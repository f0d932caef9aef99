//! Base64 and gzip handling for record payloads.

use crate::error::RecordError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::GzDecoder;
use std::io::Read as _;

/// Decode base64 record text into the bytes it carries.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(data)
}

pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Inflate a gzip stream.
///
/// Fails on a missing gzip header as well as on truncated or corrupt
/// deflate data.
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>, RecordError> {
    let mut decoder = GzDecoder::new(data);
    let mut inflated = Vec::with_capacity(data.len() * 4);
    decoder
        .read_to_end(&mut inflated)
        .map_err(RecordError::Decompress)?;
    Ok(inflated)
}

/// Base64-decode then gunzip a record's `data` field.
pub fn decode_record_data(data: &str) -> Result<Vec<u8>, RecordError> {
    let compressed = decode_base64(data)?;
    gunzip(&compressed)
}

#[cfg(test)]
pub(crate) fn gzip(data: &[u8]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write as _;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
