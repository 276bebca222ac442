//! Reading records in and writing them out.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

/// How binary records are framed on stdin/stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum WireFormat {
    /// Raw protobuf bytes.
    #[default]
    Binary,
    /// Lowercase hex; whitespace is ignored on input.
    Hex,
}

/// Reads the whole input. `None` or `-` means stdin.
pub fn read_source(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Turns raw input into record bytes.
pub fn decode_wire(raw: Vec<u8>, format: WireFormat) -> Result<Vec<u8>> {
    match format {
        WireFormat::Binary => Ok(raw),
        WireFormat::Hex => {
            let digits: Vec<u8> = raw
                .into_iter()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            hex::decode(&digits).context("invalid hex input")
        }
    }
}

/// Turns record bytes into output.
pub fn encode_wire(bytes: &[u8], format: WireFormat) -> Vec<u8> {
    match format {
        WireFormat::Binary => bytes.to_vec(),
        WireFormat::Hex => {
            let mut out = hex::encode(bytes).into_bytes();
            out.push(b'\n');
            out
        }
    }
}

pub fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes).context("failed to write stdout")?;
    stdout.flush().context("failed to flush stdout")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_input_ignores_whitespace() {
        let raw = b"0a02 6531\n1001\n".to_vec();
        let bytes = decode_wire(raw, WireFormat::Hex).unwrap();
        assert_eq!(bytes, vec![0x0a, 0x02, b'e', b'1', 0x10, 0x01]);
    }

    #[test]
    fn test_bad_hex_is_an_error() {
        assert!(decode_wire(b"0a0".to_vec(), WireFormat::Hex).is_err());
        assert!(decode_wire(b"zz".to_vec(), WireFormat::Hex).is_err());
    }

    #[test]
    fn test_binary_passes_through() {
        let raw = vec![0x00u8, 0xff, 0x20];
        assert_eq!(decode_wire(raw.clone(), WireFormat::Binary).unwrap(), raw);
        assert_eq!(encode_wire(&raw, WireFormat::Binary), raw);
    }

    #[test]
    fn test_hex_output_is_newline_terminated() {
        assert_eq!(encode_wire(&[0x10, 0x01], WireFormat::Hex), b"1001\n".to_vec());
    }

    #[test]
    fn test_read_source_reports_missing_file() {
        let err = read_source(Some(Path::new("/nonexistent/audit.bin"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/audit.bin"));
    }
}
