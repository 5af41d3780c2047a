//! Line-oriented parser for CPC files
//!
//! CPC is the native project format of the CPCe desktop tool: strictly
//! positional, comma-delimited lines with Windows-CSV quoting. A single
//! forward-only cursor is shared across all sections so errors always report
//! the true file-relative 1-based line number.

use sha2::{Digest, Sha256};
use tracing::debug;

use super::types::{CpcCorner, CpcDocument, CpcError, CpcPoint, limits};

/// Parser for `.cpc` files
pub struct CpcParser {
    /// Maximum file size in bytes
    max_file_size: u64,
    /// Maximum number of points
    max_points: u64,
}

impl Default for CpcParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CpcParser {
    /// Create a new parser with default limits
    pub fn new() -> Self {
        Self {
            max_file_size: limits::MAX_CPC_SIZE_BYTES,
            max_points: limits::MAX_POINTS,
        }
    }

    /// Create a parser with custom limits
    pub fn with_limits(max_file_size: u64, max_points: u64) -> Self {
        Self {
            max_file_size,
            max_points,
        }
    }

    /// Parse a `.cpc` file from raw bytes.
    ///
    /// Accepts an optional UTF-8 byte-order mark and any mix of CRLF/CR/LF
    /// line endings. The returned hash is of the raw bytes as uploaded.
    pub fn parse_bytes(&self, data: &[u8]) -> Result<ParsedCpc, CpcError> {
        let file_size = data.len() as u64;
        if file_size > self.max_file_size {
            return Err(CpcError::FileTooLarge {
                size: file_size,
                max: self.max_file_size,
            });
        }

        let mut hasher = Sha256::new();
        hasher.update(data);
        let content_sha256 = hex::encode(hasher.finalize());

        let text = std::str::from_utf8(data).map_err(|_| CpcError::Encoding)?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let document = self.parse_str(text)?;

        debug!(
            "Parsed CPC document: {} points, {} headers, hash={}",
            document.points.len(),
            document.headers.len(),
            &content_sha256[..16]
        );

        Ok(ParsedCpc {
            document,
            content_sha256,
        })
    }

    /// Parse a `.cpc` file from already-decoded text
    pub fn parse_str(&self, text: &str) -> Result<CpcDocument, CpcError> {
        let mut cursor = LineCursor::new(text);

        // Line 1: code filepath, image filepath, image dims, display dims
        let mut header = cursor.read_tokens(6)?.into_iter();
        let code_filepath = header.next().unwrap_or_default();
        let image_filepath = header.next().unwrap_or_default();
        let image_width = parse_dimension(&header.next().unwrap_or_default(), cursor.last_line())?;
        let image_height = parse_dimension(&header.next().unwrap_or_default(), cursor.last_line())?;
        let display_width = header.next().unwrap_or_default();
        let display_height = header.next().unwrap_or_default();

        // Lines 2-5: annotation-area corners in fixed order
        let bottom_left = read_corner(&mut cursor)?;
        let bottom_right = read_corner(&mut cursor)?;
        let top_right = read_corner(&mut cursor)?;
        let top_left = read_corner(&mut cursor)?;

        // Line 6: point count
        let count_token = cursor.read_tokens(1)?.swap_remove(0);
        let point_count = parse_point_count(&count_token, cursor.last_line())?;
        if point_count > self.max_points {
            return Err(CpcError::TooManyPoints {
                count: point_count,
                max: self.max_points,
            });
        }

        // Next N lines: point positions, in point-number order
        let mut positions = Vec::with_capacity(point_count as usize);
        for _ in 0..point_count {
            let tokens = cursor.read_tokens(2)?;
            let line = cursor.last_line();
            let x = parse_coordinate(&tokens[0], line)?;
            let y = parse_coordinate(&tokens[1], line)?;
            positions.push((x, y));
        }

        // Next N lines: point labels
        let mut points = Vec::with_capacity(point_count as usize);
        for (x, y) in positions {
            let mut tokens = cursor.read_tokens(4)?.into_iter();
            let number_label = tokens.next().unwrap_or_default();
            let id = tokens.next().unwrap_or_default();
            // Third token is a constant field (always "Notes" in practice);
            // not validated further.
            let _ = tokens.next();
            let notes = tokens.next().unwrap_or_default();
            points.push(CpcPoint {
                x,
                y,
                number_label,
                id,
                notes,
            });
        }

        // Remaining lines: free-form headers, up to 28. Older tool versions
        // omit them; absence is valid and is preserved, not padded.
        let mut headers = Vec::new();
        while cursor.remaining() > 0 {
            if headers.len() == limits::HEADER_LINES {
                return Err(CpcError::Line {
                    line: cursor.next_line(),
                    message: format!("Expected at most {} header lines", limits::HEADER_LINES),
                });
            }
            headers.push(cursor.read_tokens(1)?.swap_remove(0));
        }

        Ok(CpcDocument {
            code_filepath,
            image_filepath,
            image_width,
            image_height,
            display_width,
            display_height,
            annotation_area: [bottom_left, bottom_right, top_right, top_left],
            points,
            headers,
        })
    }
}

/// Complete parsed CPC data with the content hash of the raw upload
#[derive(Debug)]
pub struct ParsedCpc {
    pub document: CpcDocument,
    pub content_sha256: String,
}

fn read_corner(cursor: &mut LineCursor) -> Result<CpcCorner, CpcError> {
    let mut tokens = cursor.read_tokens(2)?.into_iter();
    Ok(CpcCorner {
        x: tokens.next().unwrap_or_default(),
        y: tokens.next().unwrap_or_default(),
    })
}

fn parse_dimension(token: &str, line: usize) -> Result<u32, CpcError> {
    token
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| CpcError::Line {
            line,
            message: format!("Expected a positive integer image dimension, got '{}'", token),
        })
}

fn parse_point_count(token: &str, line: usize) -> Result<u64, CpcError> {
    token
        .parse::<i64>()
        .ok()
        .filter(|v| *v > 0)
        .map(|v| v as u64)
        .ok_or_else(|| CpcError::Line {
            line,
            message: format!("Expected a positive integer point count, got '{}'", token),
        })
}

fn parse_coordinate(token: &str, line: usize) -> Result<i64, CpcError> {
    token.parse::<i64>().map_err(|_| CpcError::Line {
        line,
        message: format!("Expected an integer point position, got '{}'", token),
    })
}

/// Forward-only line cursor over the whole file.
///
/// All sections read through the same cursor, so the line numbers carried in
/// errors are global across the file rather than local to a section.
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: split_lines(text),
            pos: 0,
        }
    }

    /// 1-based number of the line most recently read
    fn last_line(&self) -> usize {
        self.pos
    }

    /// 1-based number of the line the next read would consume
    fn next_line(&self) -> usize {
        self.pos + 1
    }

    fn remaining(&self) -> usize {
        self.lines.len() - self.pos
    }

    /// Read exactly `expected` comma tokens from the next line, advancing it.
    fn read_tokens(&mut self, expected: usize) -> Result<Vec<String>, CpcError> {
        let Some(line) = self.lines.get(self.pos) else {
            return Err(CpcError::TooFewLines);
        };
        self.pos += 1;

        let tokens = split_tokens(line);
        if tokens.len() != expected {
            return Err(CpcError::Line {
                line: self.pos,
                message: format!(
                    "Expected {} comma-separated tokens, found {}",
                    expected,
                    tokens.len()
                ),
            });
        }
        Ok(tokens)
    }
}

/// Split text into lines on CRLF, CR, or LF.
///
/// A trailing terminator does not produce a phantom empty final line.
fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Split one line into comma tokens with Windows-CSV double-quote awareness.
///
/// A quoted field may contain commas; a doubled quote inside a quoted field
/// reads as a single quote. Tokens are trimmed of surrounding whitespace
/// after splitting.
fn split_tokens(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => tokens.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
    }
    tokens.push(field);

    tokens.into_iter().map(|t| t.trim().to_string()).collect()
}

/// Simple hex encoding for SHA256 hashes
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes
            .as_ref()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}
