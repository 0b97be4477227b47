//! Record ingestion with encoding and delimiter auto-detection.
//!
//! Converts CSV rows or JSON arrays into input records (JSON objects).
//! No schema-specific logic here.

use serde_json::{json, Map, Value};
use std::io::Read;
use std::path::Path;

use crate::error::ParseError;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed records as JSON objects
    pub records: Vec<Value>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> Result<String, ParseError> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .map_err(|e| ParseError::Encoding(format!("invalid utf-8: {}", e))),
        // WINDOWS_1252 is a Latin-1 superset
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => {
            Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        _ => {
            // Fallback: UTF-8 with lossy conversion
            Ok(String::from_utf8_lossy(bytes).to_string())
        }
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into input records with an explicit delimiter.
///
/// Each row becomes a JSON object where keys are column headers.
///
/// # Example
/// ```ignore
/// use normalazy::csv_to_records;
///
/// let csv = "name;age\nAlice;30\nBob;25";
/// let rows = csv_to_records(csv, ';').unwrap();
///
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0]["name"], "Alice");
/// assert_eq!(rows[0]["age"], "30");
/// ```
pub fn csv_to_records(csv: &str, delimiter: char) -> Result<Vec<Value>, ParseError> {
    parse_csv(csv.as_bytes(), delimiter)
}

/// Parse CSV from a reader into input records.
pub fn parse_csv<R: Read>(reader: R, delimiter: char) -> Result<Vec<Value>, ParseError> {
    read_rows(reader, delimiter).map(|(_, records)| records)
}

fn read_rows<R: Read>(reader: R, delimiter: char) -> Result<(Vec<String>, Vec<Value>), ParseError> {
    if !delimiter.is_ascii() {
        return Err(ParseError::InvalidDelimiter(delimiter));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ParseError::NoHeaders);
    }

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;

        if row.iter().all(|field| field.is_empty()) {
            continue;
        }

        let mut obj = Map::new();
        for (i, header) in headers.iter().enumerate() {
            obj.insert(header.clone(), json!(row.get(i).unwrap_or("")));
        }
        records.push(Value::Object(obj));
    }

    Ok((headers, records))
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file_auto("/path/to/file.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Records: {}", result.records.len());
/// ```
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> Result<ParseResult, ParseError> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> Result<ParseResult, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    tracing::debug!(%encoding, %delimiter, "detected csv format");

    let (headers, records) = read_rows(content.as_bytes(), delimiter)?;

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

/// Parse a JSON array of objects into input records.
pub fn json_to_records(json: &str) -> Result<Vec<Value>, ParseError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(ParseError::NotAnArray),
    }
}
