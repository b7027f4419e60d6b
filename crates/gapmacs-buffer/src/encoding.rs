//! Character encodings and line-ending conventions of files on disk.
//!
//! In memory a buffer is always UTF-8 with `\n` line breaks. Loading picks the
//! first candidate encoding that decodes the whole file without error and
//! looks at the first line terminator to choose a [`FileFormat`]; saving
//! reverses both transforms.

use encoding_rs::{EUC_JP, Encoding, SHIFT_JIS, UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::{BufferError, BufferResult};

/// Line-ending convention of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// `\n`
    #[default]
    Unix,
    /// `\r\n`
    Dos,
    /// `\r`
    Mac,
}

impl FileFormat {
    /// The line terminator written on save.
    pub fn line_terminator(&self) -> &'static str {
        match self {
            FileFormat::Unix => "\n",
            FileFormat::Dos => "\r\n",
            FileFormat::Mac => "\r",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Unix => "unix",
            FileFormat::Dos => "dos",
            FileFormat::Mac => "mac",
        }
    }

    /// Detects the convention from the first line terminator in `text`.
    pub fn detect(text: &str) -> Self {
        match text.find(['\r', '\n']) {
            Some(i) if text.as_bytes()[i] == b'\n' => FileFormat::Unix,
            Some(i) if text.as_bytes().get(i + 1) == Some(&b'\n') => FileFormat::Dos,
            Some(_) => FileFormat::Mac,
            None => FileFormat::Unix,
        }
    }

    /// Converts file line endings to `\n`.
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            FileFormat::Unix => Cow::Borrowed(text),
            FileFormat::Dos => Cow::Owned(text.replace("\r\n", "\n")),
            FileFormat::Mac => Cow::Owned(text.replace('\r', "\n")),
        }
    }

    /// Converts `\n` back to this format's terminator.
    pub fn denormalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            FileFormat::Unix => Cow::Borrowed(text),
            _ => Cow::Owned(text.replace('\n', self.line_terminator())),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unix" | "lf" => Ok(FileFormat::Unix),
            "dos" | "crlf" => Ok(FileFormat::Dos),
            "mac" | "cr" => Ok(FileFormat::Mac),
            other => Err(format!("unknown file format: {other}")),
        }
    }
}

/// The default detection order: UTF-8, EUC-JP, Windows-31J, Windows-1252.
pub fn default_encodings() -> Vec<&'static Encoding> {
    vec![UTF_8, EUC_JP, SHIFT_JIS, WINDOWS_1252]
}

/// Resolves an encoding label such as `"euc-jp"` or `"windows-31j"`.
pub fn encoding_for_label(label: &str) -> BufferResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| BufferError::UnknownEncoding(label.to_string()))
}

/// Decodes `bytes` with the first candidate that accepts all of them.
///
/// Falls back to lossy UTF-8 when no candidate fits.
pub(crate) fn decode(bytes: &[u8], candidates: &[&'static Encoding]) -> (&'static Encoding, String) {
    for &encoding in candidates {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return (encoding, text.into_owned());
        }
    }
    tracing::warn!(
        candidates = candidates.len(),
        "no candidate encoding fits, decoding as lossy UTF-8"
    );
    (UTF_8, String::from_utf8_lossy(bytes).into_owned())
}

/// Encodes `text`, failing if a character has no mapping in `encoding`.
pub(crate) fn encode(text: &str, encoding: &'static Encoding) -> BufferResult<Vec<u8>> {
    if encoding == UTF_8 {
        return Ok(text.as_bytes().to_vec());
    }
    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(BufferError::Unencodable(encoding.name()));
    }
    Ok(bytes.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(FileFormat::detect("foo"), FileFormat::Unix);
        assert_eq!(FileFormat::detect(""), FileFormat::Unix);
        assert_eq!(FileFormat::detect("foo\nbar\r\n"), FileFormat::Unix);
        assert_eq!(FileFormat::detect("foo\r\nbar\r\n"), FileFormat::Dos);
        assert_eq!(FileFormat::detect("foo\rbar\r"), FileFormat::Mac);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(FileFormat::Dos.normalize("a\r\nb\r\n"), "a\nb\n");
        assert_eq!(FileFormat::Mac.normalize("a\rb\r"), "a\nb\n");
        assert_eq!(FileFormat::Unix.normalize("a\nb\r\n"), "a\nb\r\n");
        assert_eq!(FileFormat::Dos.denormalize("a\nb\n"), "a\r\nb\r\n");
        assert_eq!(FileFormat::Mac.denormalize("a\nb\n"), "a\rb\r");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("dos".parse::<FileFormat>().unwrap(), FileFormat::Dos);
        assert_eq!("LF".parse::<FileFormat>().unwrap(), FileFormat::Unix);
        assert!("vms".parse::<FileFormat>().is_err());
    }

    #[test]
    fn test_decode_picks_first_fit() {
        let (euc, _, _) = EUC_JP.encode("こんにちは\n");
        let (encoding, text) = decode(&euc, &default_encodings());
        assert_eq!(encoding, EUC_JP);
        assert_eq!(text, "こんにちは\n");

        let (sjis, _, _) = SHIFT_JIS.encode("こんにちは\n");
        let (encoding, text) = decode(&sjis, &default_encodings());
        assert_eq!(encoding, SHIFT_JIS);
        assert_eq!(text, "こんにちは\n");

        let (encoding, _) = decode("hello".as_bytes(), &default_encodings());
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_decode_falls_back_to_lossy_utf8() {
        let (encoding, text) = decode(&[b'a', 0xFF], &[UTF_8]);
        assert_eq!(encoding, UTF_8);
        assert_eq!(text, "a\u{FFFD}");
    }

    #[test]
    fn test_encode_rejects_unmappable() {
        assert_eq!(encode("abc", SHIFT_JIS).unwrap(), b"abc");
        assert!(matches!(
            encode("😀", SHIFT_JIS),
            Err(BufferError::Unencodable(_))
        ));
    }

    #[test]
    fn test_encoding_labels() {
        assert_eq!(encoding_for_label("windows-31j").unwrap(), SHIFT_JIS);
        assert_eq!(encoding_for_label("EUC-JP").unwrap(), EUC_JP);
        assert!(encoding_for_label("klingon").is_err());
    }
}
