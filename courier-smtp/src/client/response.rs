//! SMTP response parsing and representation.

use super::error::{ClientError, Result};

/// Represents a single line in an SMTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLine {
    /// The SMTP status code (e.g., 220, 250, 550).
    pub code: u16,
    /// Whether this is the last line in a multi-line response.
    pub is_last: bool,
    /// The message text following the status code.
    pub message: String,
}

/// Represents a complete SMTP response, which may be multi-line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The SMTP status code.
    pub code: u16,
    /// All message lines in the response.
    pub lines: Vec<String>,
}

impl Response {
    #[must_use]
    pub const fn new(code: u16, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// Returns the complete message as a single string with lines joined by newlines.
    #[must_use]
    pub fn message(&self) -> String {
        self.lines.join("\n")
    }

    /// Returns `true` if this response indicates success (2xx code).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// Returns `true` for 3xx codes (DATA go-ahead, AUTH challenges).
    #[must_use]
    pub const fn is_intermediate(&self) -> bool {
        self.code >= 300 && self.code < 400
    }

    /// Returns `true` if this response indicates a temporary error (4xx code).
    #[must_use]
    pub const fn is_temporary_error(&self) -> bool {
        self.code >= 400 && self.code < 500
    }

    /// Returns `true` if this response indicates a permanent error (5xx code).
    #[must_use]
    pub const fn is_permanent_error(&self) -> bool {
        self.code >= 500 && self.code < 600
    }

    /// Returns `true` if this response indicates any error (4xx or 5xx code).
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_temporary_error() || self.is_permanent_error()
    }

    /// The extension lines of an EHLO response (everything after the greeting line).
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().skip(1).map(String::as_str)
    }

    /// Whether an EHLO response advertises `keyword` (case-insensitive).
    #[must_use]
    pub fn supports(&self, keyword: &str) -> bool {
        self.extensions().any(|line| {
            line.split_whitespace()
                .next()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(keyword))
        })
    }

    /// SASL mechanisms from the `AUTH` line of an EHLO response, uppercased.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<String> {
        self.extensions()
            .filter_map(|line| {
                let mut words = line.split_whitespace();
                words
                    .next()
                    .filter(|ext| ext.eq_ignore_ascii_case("AUTH"))
                    .map(|_| words.map(str::to_ascii_uppercase).collect::<Vec<_>>())
            })
            .flatten()
            .collect()
    }

    /// Parses a single response line.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ParseError` if the line doesn't match SMTP format.
    pub fn parse_line(line: &str) -> Result<ResponseLine> {
        let code_str = line
            .get(..3)
            .ok_or_else(|| ClientError::ParseError(format!("Response line too short: '{line}'")))?;

        let code = code_str
            .parse::<u16>()
            .map_err(|_| ClientError::ParseError(format!("Invalid status code: '{code_str}'")))?;

        let rest = &line[3..];
        let (is_last, message) = match rest.chars().next() {
            None => (true, ""),
            Some(' ') => (true, &rest[1..]),
            Some('-') => (false, &rest[1..]),
            Some(c) => {
                return Err(ClientError::ParseError(format!(
                    "Invalid separator character: '{c}'"
                )));
            }
        };

        Ok(ResponseLine {
            code,
            is_last,
            message: message.to_string(),
        })
    }

    /// Parses a complete multi-line SMTP response from a buffer.
    ///
    /// Returns the parsed `Response` and the number of bytes consumed, or
    /// `None` if the buffer does not yet hold a complete response.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ParseError` if the response is malformed.
    pub fn parse_response(buffer: &[u8]) -> Result<Option<(Self, usize)>> {
        // A read may split a multi-byte character; parse only the valid prefix
        let text = match std::str::from_utf8(buffer) {
            Ok(text) => text,
            Err(e) if e.error_len().is_none() => std::str::from_utf8(&buffer[..e.valid_up_to()])?,
            Err(e) => return Err(e.into()),
        };

        let mut lines = Vec::new();
        let mut bytes_consumed = 0;
        let mut first_code = None;

        for raw in text.split_inclusive('\n') {
            if !raw.ends_with('\n') {
                // Incomplete line
                return Ok(None);
            }
            bytes_consumed += raw.len();

            let line = raw.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }

            let parsed_line = Self::parse_line(line)?;

            match first_code {
                Some(code) if parsed_line.code != code => {
                    return Err(ClientError::ParseError(format!(
                        "Status code mismatch in multi-line response: expected {code}, got {}",
                        parsed_line.code
                    )));
                }
                Some(_) => {}
                None => first_code = Some(parsed_line.code),
            }

            lines.push(parsed_line.message);

            if parsed_line.is_last {
                return Ok(first_code.map(|code| (Self::new(code, lines), bytes_consumed)));
            }
        }

        Ok(None) // Need more data
    }
}
