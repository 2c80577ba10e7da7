//! Whole-file text documents as the proofing stages see them.
//!
//! A document is decoded once when opened and held with `\n` line breaks.
//! Saving writes the text back in the byte format it was read in, so a
//! Shift-JIS chapter with CRLF line breaks stays Shift-JIS with CRLF after
//! corrections are patched in.

use std::borrow::Cow;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }

    /// The first line break decides; text without one counts as `Lf`.
    fn sniff(text: &str) -> Self {
        match text.find(|ch: char| ch == '\r' || ch == '\n') {
            Some(idx) if text[idx..].starts_with("\r\n") => LineEnding::CrLf,
            Some(idx) if text.as_bytes()[idx] == b'\r' => LineEnding::Cr,
            _ => LineEnding::Lf,
        }
    }
}

/// Byte-level shape of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFormat {
    pub encoding: &'static Encoding,
    pub bom: bool,
    pub line_ending: LineEnding,
}

impl TextFormat {
    /// Decodes `bytes`, returning the format and the text with its original
    /// line breaks.
    ///
    /// A BOM wins; otherwise valid UTF-8 is taken as UTF-8 and anything else
    /// goes to the legacy detector.
    fn decode(bytes: &[u8]) -> Result<(Self, String), DocumentError> {
        let (encoding, bom_len) = match Encoding::for_bom(bytes) {
            Some(found) => found,
            None if std::str::from_utf8(bytes).is_ok() => (UTF_8, 0),
            None => (guess_legacy(bytes), 0),
        };
        let text = encoding
            .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
            .ok_or(DocumentError::Undecodable {
                encoding: encoding.name(),
            })?
            .into_owned();
        let format = Self {
            encoding,
            bom: bom_len > 0,
            line_ending: LineEnding::sniff(&text),
        };
        Ok((format, text))
    }

    /// Encodes `\n`-separated `text` into this format.
    fn encode(&self, text: &str) -> Result<Vec<u8>, DocumentError> {
        let text = match self.line_ending {
            LineEnding::Lf => Cow::Borrowed(text),
            other => Cow::Owned(text.replace('\n', other.as_str())),
        };

        // encoding_rs only encodes into ASCII-compatible encodings.
        if self.encoding == UTF_16LE || self.encoding == UTF_16BE {
            let big_endian = self.encoding == UTF_16BE;
            let mut bytes = Vec::with_capacity(text.len() * 2 + 2);
            if self.bom {
                let bom: [u8; 2] = if big_endian { [0xFE, 0xFF] } else { [0xFF, 0xFE] };
                bytes.extend_from_slice(&bom);
            }
            for unit in text.encode_utf16() {
                let pair = if big_endian {
                    unit.to_be_bytes()
                } else {
                    unit.to_le_bytes()
                };
                bytes.extend_from_slice(&pair);
            }
            return Ok(bytes);
        }

        let (encoded, _, unmappable) = self.encoding.encode(&text);
        if unmappable {
            return Err(DocumentError::Unrepresentable {
                encoding: self.encoding.name(),
            });
        }
        let mut bytes = Vec::with_capacity(encoded.len() + 3);
        if self.bom && self.encoding == UTF_8 {
            bytes.extend_from_slice(b"\xEF\xBB\xBF");
        }
        bytes.extend_from_slice(&encoded);
        Ok(bytes)
    }
}

fn guess_legacy(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("content is not valid {encoding}")]
    Undecodable { encoding: &'static str },
    #[error("text cannot be written back as {encoding}")]
    Unrepresentable { encoding: &'static str },
}

impl DocumentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::Io(err) if err.kind() == io::ErrorKind::NotFound)
    }
}

/// A document or log read from disk.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    text: String,
    format: TextFormat,
}

impl Document {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let (format, text) = TextFormat::decode(&bytes)?;
        debug!(
            path = %path.display(),
            encoding = format.encoding.name(),
            bom = format.bom,
            line_ending = ?format.line_ending,
            "opened document"
        );
        Ok(Self {
            path: path.to_path_buf(),
            text: unify_line_breaks(text),
            format,
        })
    }

    /// Text with `\n` line breaks.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> TextFormat {
        self.format
    }

    pub fn replace_text(&mut self, text: String) {
        self.text = unify_line_breaks(text);
    }

    /// Writes the text back to the path it was opened from, in its original format.
    pub fn save(&self) -> Result<(), DocumentError> {
        let bytes = self.format.encode(&self.text)?;
        write_atomic(&self.path, &bytes)?;
        Ok(())
    }
}

fn unify_line_breaks(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Writes `data` to a sibling temp file, syncs it, then renames it over `path`.
///
/// The target is either fully replaced or left as it was. The parent
/// directory must already exist.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let mut tmp_name = OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".scriptproof-tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let written = (|| {
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(data)?;
        tmp_file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();
    if written.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply;
    use crate::detector::scan;
    use crate::error::ProofError;
    use crate::ReplacementMap;
    use encoding_rs::SHIFT_JIS;
    use tempfile::tempdir;

    fn shift_jis(text: &str) -> Vec<u8> {
        let (bytes, _, unmappable) = SHIFT_JIS.encode(text);
        assert!(!unmappable);
        bytes.into_owned()
    }

    #[test]
    fn shift_jis_chapter_stays_shift_jis_after_corrections() {
        let dir = tempdir().unwrap();
        let chapter = dir.path().join("chapter.txt");
        fs::write(
            &chapter,
            shift_jis("第一章 始まり\r\n猫が鳴いた。とても静かな夜だった。\r\n"),
        )
        .unwrap();
        assert_eq!(Document::open(&chapter).unwrap().format().encoding, SHIFT_JIS);

        let map: ReplacementMap = [("猫が鳴いた", "The cat meowed")].into_iter().collect();
        let report = apply(&chapter, &map).unwrap();

        assert!(report.changed);
        assert_eq!(
            fs::read(&chapter).unwrap(),
            shift_jis("第一章 始まり\r\nThe cat meowed。とても静かな夜だった。\r\n")
        );
    }

    #[test]
    fn correction_outside_the_source_encoding_leaves_file_alone() {
        let dir = tempdir().unwrap();
        let chapter = dir.path().join("chapter.txt");
        let original = shift_jis("猫が鳴いた。とても静かな夜だった。\n");
        fs::write(&chapter, &original).unwrap();

        let map: ReplacementMap = [("猫", "고양이")].into_iter().collect();
        let err = apply(&chapter, &map).unwrap_err();

        assert!(matches!(
            err,
            ProofError::Write {
                source: DocumentError::Unrepresentable { .. },
                ..
            }
        ));
        assert_eq!(fs::read(&chapter).unwrap(), original);
    }

    #[test]
    fn crlf_document_round_trips_through_scan() {
        let dir = tempdir().unwrap();
        let doc = dir.path().join("script.txt");
        let log = dir.path().join("check.log");
        fs::write(&doc, "intro\r\n「台詞」\r\n(注) end\r\n").unwrap();

        let subs: ReplacementMap = [("「", "\""), ("」", "\"")].into_iter().collect();
        let report = scan(&doc, &subs, &log).unwrap();

        assert_eq!(
            fs::read_to_string(&doc).unwrap(),
            "intro\r\n\" 台詞\" \r\n(注) end\r\n"
        );
        assert_eq!(report.finding_texts(), vec!["\" 台詞\""]);
        assert_eq!(fs::read_to_string(&log).unwrap(), "\" 台詞\"\n");
    }

    #[test]
    fn utf16_be_document_keeps_bom_and_byte_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "訳注\r\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        fs::write(&path, &bytes).unwrap();

        let mut doc = Document::open(&path).unwrap();
        assert_eq!(doc.text(), "訳注\n");
        assert_eq!(
            doc.format(),
            TextFormat {
                encoding: UTF_16BE,
                bom: true,
                line_ending: LineEnding::CrLf,
            }
        );

        doc.replace_text("Note\n".to_string());
        doc.save().unwrap();
        let written = fs::read(&path).unwrap();
        assert_eq!(&written[..4], &[0xFE, 0xFF, 0x00, b'N']);
        assert_eq!(&written[written.len() - 4..], &[0x00, b'\r', 0x00, b'\n']);
    }

    #[test]
    fn broken_utf8_after_bom_is_undecodable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.log");
        fs::write(&path, b"\xEF\xBB\xBF\xFF\xFE").unwrap();

        let err = Document::open(&path).unwrap_err();
        assert!(matches!(err, DocumentError::Undecodable { encoding: "UTF-8" }));
        assert!(!err.is_not_found());
        assert!(Document::open(dir.path().join("absent.log"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("target.txt");
        write_atomic(&file_path, b"payload").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("target.txt")]);
        assert_eq!(fs::read(&file_path).unwrap(), b"payload");
    }
}
