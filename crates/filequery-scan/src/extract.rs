//! Bounded text snippet extraction.
//!
//! Text files are read as UTF-8, one character at a time, so that exactly
//! the requested number of characters is consumed and a decoding problem
//! is detected at the character where it occurs. Three fields are read
//! back to back: text, list and memo. `\r\n` and a lone `\r` are read as
//! a single `\n`.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use filequery_core::{FileRecord, RecordSet, RecordStatus, SnippetSizes, TextSnippets, TextSuffix};

/// Visible replacement for newlines in snippets.
pub const NEWLINE_MARKER: &str = "<NL>";

/// Why a text file could not be read.
#[derive(Debug)]
enum ExtractFailure {
    Open(std::io::Error),
    Decode,
    Read(std::io::Error),
}

impl ExtractFailure {
    fn status(&self) -> RecordStatus {
        match self {
            Self::Open(_) => RecordStatus::OpenFailed,
            Self::Decode => RecordStatus::DecodeFailed,
            Self::Read(_) => RecordStatus::ReadFailed,
        }
    }
}

impl fmt::Display for ExtractFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(e) => write!(f, "open failed: {e}"),
            Self::Decode => write!(f, "content is not valid UTF-8"),
            Self::Read(e) => write!(f, "read failed: {e}"),
        }
    }
}

/// Fills the snippet fields of records whose extension marks them as text.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    sizes: SnippetSizes,
    text_suffix: TextSuffix,
}

impl TextExtractor {
    /// Create an extractor reading `sizes` characters from `text_suffix` files.
    pub fn new(sizes: SnippetSizes, text_suffix: TextSuffix) -> Self {
        Self { sizes, text_suffix }
    }

    /// Extract snippets for every record in place.
    pub fn extract(&self, records: &mut RecordSet) {
        for record in records.iter_mut() {
            self.extract_record(record);
        }
    }

    /// Extract snippets for one record.
    ///
    /// On failure the snippets stay unset and the failure replaces any
    /// earlier status. On success an earlier collection failure is kept.
    pub fn extract_record(&self, record: &mut FileRecord) {
        record.text = None;

        if !self.text_suffix.matches_extension(&record.extension) {
            record.fail_extraction(RecordStatus::NotText);
            return;
        }

        match self.read_snippets(&record.full_path) {
            Ok(snippets) => record.text = Some(snippets),
            Err(failure) => {
                tracing::warn!(path = %record.full_path.display(), %failure, "text unavailable");
                record.fail_extraction(failure.status());
            }
        }
    }

    fn read_snippets(&self, path: &Path) -> Result<TextSnippets, ExtractFailure> {
        let file = File::open(path).map_err(ExtractFailure::Open)?;
        let mut reader = BufReader::new(file);

        let text = read_chars(&mut reader, self.sizes.text)?;
        let list = read_chars(&mut reader, self.sizes.list)?;
        let memo = read_chars(&mut reader, self.sizes.memo)?;

        Ok(TextSnippets {
            text_escaped: escape(&text),
            text: mark_newlines(&text),
            list: mark_newlines(&list),
            memo: mark_newlines(&memo),
        })
    }
}

/// Replace every newline with [`NEWLINE_MARKER`].
pub fn mark_newlines(text: &str) -> String {
    text.replace('\n', NEWLINE_MARKER)
}

/// Render control characters, quotes, backslashes and non-ASCII characters
/// as escape sequences.
pub fn escape(text: &str) -> String {
    text.escape_default().to_string()
}

/// Read up to `max` UTF-8 characters. Stops early at end of file.
///
/// Each line ending counts as one character and is returned as `\n`.
fn read_chars<R: BufRead>(reader: &mut R, max: usize) -> Result<String, ExtractFailure> {
    let mut text = String::new();
    let mut buf = [0u8; 4];

    for _ in 0..max {
        if !read_byte(reader, &mut buf[0])? {
            break;
        }
        if buf[0] == b'\r' {
            skip_line_feed(reader)?;
            text.push('\n');
            continue;
        }
        let width = utf8_width(buf[0]).ok_or(ExtractFailure::Decode)?;
        if width > 1 {
            reader.read_exact(&mut buf[1..width]).map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => ExtractFailure::Decode,
                _ => ExtractFailure::Read(e),
            })?;
        }
        let ch = std::str::from_utf8(&buf[..width]).map_err(|_| ExtractFailure::Decode)?;
        text.push_str(ch);
    }

    Ok(text)
}

/// Consume the `\n` of a `\r\n` pair, if there is one.
fn skip_line_feed<R: BufRead>(reader: &mut R) -> Result<(), ExtractFailure> {
    loop {
        let line_feed = match reader.fill_buf() {
            Ok(buf) => buf.first() == Some(&b'\n'),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ExtractFailure::Read(e)),
        };
        if line_feed {
            reader.consume(1);
        }
        return Ok(());
    }
}

/// Read one byte, returning false at end of file.
fn read_byte<R: Read>(reader: &mut R, byte: &mut u8) -> Result<bool, ExtractFailure> {
    loop {
        match reader.read(std::slice::from_mut(byte)) {
            Ok(0) => return Ok(false),
            Ok(_) => return Ok(true),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ExtractFailure::Read(e)),
        }
    }
}

/// Encoded length of a UTF-8 sequence from its first byte.
fn utf8_width(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn extractor(text: usize) -> TextExtractor {
        TextExtractor::new(SnippetSizes::text_only(text), TextSuffix::default())
    }

    #[test]
    fn test_read_chars_counts_characters_not_bytes() {
        let mut reader = Cursor::new("héllo wörld".as_bytes());
        assert_eq!(read_chars(&mut reader, 5).unwrap(), "héllo");
        assert_eq!(read_chars(&mut reader, 100).unwrap(), " wörld");
    }

    #[test]
    fn test_read_chars_rejects_invalid_utf8() {
        let mut reader = Cursor::new(vec![b'o', b'k', 0xFF, b'x']);
        assert!(matches!(
            read_chars(&mut reader, 10),
            Err(ExtractFailure::Decode)
        ));

        // Truncated multi-byte sequence at end of file.
        let mut reader = Cursor::new(vec![b'a', 0xE2, 0x82]);
        assert!(matches!(
            read_chars(&mut reader, 10),
            Err(ExtractFailure::Decode)
        ));

        // Encoded surrogate.
        let mut reader = Cursor::new(vec![0xED, 0xA0, 0x80]);
        assert!(matches!(
            read_chars(&mut reader, 10),
            Err(ExtractFailure::Decode)
        ));
    }

    #[test]
    fn test_invalid_bytes_past_the_limit_are_not_read() {
        let mut reader = Cursor::new(vec![b'a', b'b', 0xFF]);
        assert_eq!(read_chars(&mut reader, 2).unwrap(), "ab");
    }

    #[test]
    fn test_line_endings_read_as_one_newline() {
        let mut reader = Cursor::new("ab\r\ncd\r\n".as_bytes());
        assert_eq!(mark_newlines(&read_chars(&mut reader, 5).unwrap()), "ab<NL>cd");
        assert_eq!(read_chars(&mut reader, 5).unwrap(), "\n");

        let mut reader = Cursor::new("a\rb\r".as_bytes());
        assert_eq!(read_chars(&mut reader, 10).unwrap(), "a\nb\n");

        // A pair split across two fields still counts once.
        let mut reader = Cursor::new("ab\r\ncd".as_bytes());
        assert_eq!(read_chars(&mut reader, 3).unwrap(), "ab\n");
        assert_eq!(read_chars(&mut reader, 2).unwrap(), "cd");
    }

    #[test]
    fn test_markers_and_escaping() {
        assert_eq!(mark_newlines("a\nb\n"), "a<NL>b<NL>");
        assert_eq!(escape("a\tb\n\"é"), "a\\tb\\n\\\"\\u{e9}");
    }

    #[test]
    fn test_extract_consecutive_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("memo.txt");
        fs::write(&path, "abc\ndefghij\nklmnop").unwrap();

        let extractor = TextExtractor::new(
            SnippetSizes {
                text: 4,
                list: 3,
                memo: 100,
            },
            TextSuffix::default(),
        );
        let mut record = FileRecord::new(&path);
        extractor.extract_record(&mut record);

        let text = record.text.unwrap();
        assert_eq!(text.text, "abc<NL>");
        assert_eq!(text.text_escaped, "abc\\n");
        assert_eq!(text.list, "def");
        assert_eq!(text.memo, "ghij<NL>klmnop");
        assert_eq!(record.status, RecordStatus::Ok);
    }

    #[test]
    fn test_not_text() {
        let mut record = FileRecord::new("/data/image.png");
        extractor(20).extract_record(&mut record);

        assert!(record.text.is_none());
        assert_eq!(record.status, RecordStatus::NotText);
    }

    #[test]
    fn test_open_failure() {
        let temp = TempDir::new().unwrap();
        let mut record = FileRecord::new(temp.path().join("missing.txt"));
        extractor(20).extract_record(&mut record);

        assert!(record.text.is_none());
        assert_eq!(record.status, RecordStatus::OpenFailed);
    }

    #[test]
    fn test_decode_failure() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("latin1.txt");
        fs::write(&path, b"caf\xe9 au lait").unwrap();

        let mut record = FileRecord::new(&path);
        extractor(20).extract_record(&mut record);

        assert!(record.text.is_none());
        assert_eq!(record.status, RecordStatus::DecodeFailed);
    }

    #[test]
    fn test_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.txt");
        fs::write(&path, "").unwrap();

        let mut record = FileRecord::new(&path);
        extractor(20).extract_record(&mut record);

        let text = record.text.unwrap();
        assert_eq!(text.text, "");
        assert_eq!(text.text_escaped, "");
        assert_eq!(record.status, RecordStatus::Ok);
    }

    #[test]
    fn test_crlf_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dos.txt");
        fs::write(&path, "one\r\ntwo\r\n").unwrap();

        let mut record = FileRecord::new(&path);
        extractor(6).extract_record(&mut record);

        let text = record.text.unwrap();
        assert_eq!(text.text, "one<NL>tw");
        assert_eq!(text.text_escaped, "one\\ntw");
        assert!(!text.text.contains('\r'));
    }

    #[test]
    fn test_extraction_failure_replaces_collection_failure() {
        let temp = TempDir::new().unwrap();
        let mut record = FileRecord::new(temp.path().join("missing.txt"));
        record.fail(RecordStatus::StatFailed);
        extractor(20).extract_record(&mut record);
        assert_eq!(record.status, RecordStatus::OpenFailed);

        let mut record = FileRecord::new("/data/image.png");
        record.fail(RecordStatus::ProbeFailed);
        extractor(20).extract_record(&mut record);
        assert_eq!(record.status, RecordStatus::NotText);
    }

    #[test]
    fn test_earlier_failure_is_kept() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ok.txt");
        fs::write(&path, "fine").unwrap();

        let mut record = FileRecord::new(&path);
        record.fail(RecordStatus::ProbeFailed);
        extractor(20).extract_record(&mut record);

        assert_eq!(record.text.unwrap().text, "fine");
        assert_eq!(record.status, RecordStatus::ProbeFailed);
    }
}
