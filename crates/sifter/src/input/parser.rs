//! Delimited-file loader with delimiter detection and type inference.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::dataset::{ColumnType, Dataset, Value};
use crate::error::{Result, SifterError};
use super::source::SourceMetadata;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum data rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Ignore leading whitespace in headers and fields.
    pub ignore_leading_whitespace: bool,
    /// Infer integer/float column types (false = everything is text).
    pub infer_types: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
            ignore_leading_whitespace: true,
            infer_types: true,
        }
    }
}

/// Loads a delimited text file with a header row into a [`Dataset`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the dataset and source metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| SifterError::io(path, e))?;
        let size_bytes = file
            .metadata()
            .map_err(|e| SifterError::io(path, e))?
            .len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| SifterError::io(path, e))?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };
        let shown = (delimiter as char).escape_default().to_string();
        debug!(path = %path.display(), delimiter = %shown, "Loading input");

        let dataset = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let source = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, source))
    }

    /// Parse bytes directly.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        // Bytes that are not UTF-8 (cp1252 exports) decode to U+FFFD.
        let mut records = reader.byte_records();

        let header = match records.next() {
            Some(record) => record?,
            None => return Err(SifterError::EmptyData("No header row found".to_string())),
        };
        let raw_headers: Vec<String> = header.iter().map(|b| self.field(b)).collect();
        if raw_headers.is_empty() {
            return Err(SifterError::EmptyData("No columns found".to_string()));
        }
        let headers = safe_headers(&raw_headers);
        let expected_cols = headers.len();

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        for (row_idx, result) in records.enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            let mut row: Vec<String> = record.iter().map(|b| self.field(b)).collect();

            // Pad row if needed
            while row.len() < expected_cols {
                row.push(String::new());
            }
            // Truncate if too many columns
            row.truncate(expected_cols);

            raw_rows.push(row);
        }

        let types: Vec<ColumnType> = (0..expected_cols)
            .map(|col| {
                if self.config.infer_types {
                    raw_rows
                        .iter()
                        .fold(ColumnType::Null, |acc, row| acc.widen(ColumnType::infer(&row[col])))
                } else {
                    ColumnType::String
                }
            })
            .collect();

        let rows: Vec<Vec<Value>> = raw_rows
            .into_iter()
            .map(|row| {
                row.iter()
                    .zip(&types)
                    .map(|(raw, ty)| Value::parse(raw, *ty))
                    .collect()
            })
            .collect();

        Dataset::from_rows(headers, rows)
    }

    fn field(&self, raw: &[u8]) -> String {
        let text = String::from_utf8_lossy(raw);
        if self.config.ignore_leading_whitespace {
            text.trim_start().to_string()
        } else {
            text.into_owned()
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Make header labels usable as column names.
///
/// An empty label becomes `_c{index}`. A label that occurs more than once
/// (compared case-insensitively) gets its index appended on every occurrence.
pub fn safe_headers(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = HashSet::new();
    for name in raw.iter().filter(|n| !n.is_empty()) {
        let key = name.to_lowercase();
        if !seen.insert(key.clone()) {
            duplicates.insert(key);
        }
    }

    raw.iter()
        .enumerate()
        .map(|(index, name)| {
            if name.is_empty() {
                format!("_c{}", index)
            } else if duplicates.contains(&name.to_lowercase()) {
                format!("{}{}", name, index)
            } else {
                name.clone()
            }
        })
        .collect()
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<String> = bytes
        .split(|&b| b == b'\n')
        .take(10)
        .map(|line| String::from_utf8_lossy(line).trim_end_matches('\r').to_string())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(SifterError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tab gets a slight bonus.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_empty() {
        assert!(matches!(detect_delimiter(b"\n\n"), Err(SifterError::EmptyData(_))));
    }

    #[test]
    fn test_detect_delimiter_with_cp1252_bytes() {
        let data = b"Film;Seen\nEpisode I \x96 The Phantom Menace;Yes\nEpisode II \x96 Attack of the Clones;No\n";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_non_utf8_fields_are_replaced() {
        let data = b"Film,Seen\nStar Wars: Episode I \x96 The Phantom Menace,Yes\n";
        let dataset = Parser::new().parse_bytes(data, b',').unwrap();
        assert_eq!(dataset.row_count(), 1);
        assert_eq!(
            dataset.get(0, "Film"),
            Some(&Value::text("Star Wars: Episode I \u{FFFD} The Phantom Menace"))
        );
        assert_eq!(dataset.get(0, "Seen"), Some(&Value::text("Yes")));
    }

    #[test]
    fn test_parse_csv_infers_types() {
        let parser = Parser::new();
        let data = b"name,age,score\nAlice,30,1.5\nBob,25,2";
        let dataset = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(dataset.column_names(), vec!["name", "age", "score"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.get(0, "name"), Some(&Value::text("Alice")));
        assert_eq!(dataset.get(1, "age"), Some(&Value::Integer(25)));
        assert_eq!(dataset.get(1, "score"), Some(&Value::Float(2.0)));
    }

    #[test]
    fn test_parse_without_inference() {
        let parser = Parser::with_config(ParserConfig {
            infer_types: false,
            ..ParserConfig::default()
        });
        let dataset = parser.parse_bytes(b"id\n1\n", b',').unwrap();
        assert_eq!(dataset.get(0, "id"), Some(&Value::text("1")));
    }

    #[test]
    fn test_empty_fields_are_null() {
        let parser = Parser::new();
        let dataset = parser.parse_bytes(b"a,b\nx,\n,\n", b',').unwrap();
        assert_eq!(dataset.get(0, "b"), Some(&Value::Null));
        assert_eq!(dataset.get(1, "a"), Some(&Value::Null));
        assert!(dataset.column("b").unwrap().is_all_null());
    }

    #[test]
    fn test_leading_whitespace_ignored() {
        let parser = Parser::new();
        let dataset = parser.parse_bytes(b"a, b\n  x,   7\n", b',').unwrap();
        assert_eq!(dataset.column_names(), vec!["a", "b"]);
        assert_eq!(dataset.get(0, "a"), Some(&Value::text("x")));
        assert_eq!(dataset.get(0, "b"), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_leading_whitespace_kept_when_disabled() {
        let parser = Parser::with_config(ParserConfig {
            ignore_leading_whitespace: false,
            ..ParserConfig::default()
        });
        let dataset = parser.parse_bytes(b"a\n  x\n", b',').unwrap();
        assert_eq!(dataset.get(0, "a"), Some(&Value::text("  x")));
    }

    #[test]
    fn test_ragged_rows_padded_and_truncated() {
        let parser = Parser::new();
        let dataset = parser.parse_bytes(b"a,b\n1\n2,3,4\n", b',').unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.get(0, "b"), Some(&Value::Null));
        assert_eq!(dataset.get(1, "b"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_header_only_file() {
        let dataset = Parser::new().parse_bytes(b"a,b\n", b',').unwrap();
        assert_eq!(dataset.column_count(), 2);
        assert_eq!(dataset.row_count(), 0);
    }

    #[test]
    fn test_no_header_is_error() {
        let result = Parser::new().parse_bytes(b"", b',');
        assert!(matches!(result, Err(SifterError::EmptyData(_))));
    }

    #[test]
    fn test_max_rows() {
        let parser = Parser::with_config(ParserConfig {
            max_rows: Some(1),
            ..ParserConfig::default()
        });
        let dataset = parser.parse_bytes(b"a\n1\n2\n3\n", b',').unwrap();
        assert_eq!(dataset.row_count(), 1);
    }

    #[test]
    fn test_safe_headers_blank_and_duplicates() {
        let raw: Vec<String> = ["RespondentID", "Which films?", "", "", "Age", "age"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            safe_headers(&raw),
            vec!["RespondentID", "Which films?", "_c2", "_c3", "Age4", "age5"]
        );
    }
}
