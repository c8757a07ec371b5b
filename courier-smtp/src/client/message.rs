//! Plain-text email message builder.

use std::fmt::Write;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};

use super::error::{ClientError, Result};

/// Replace CR and LF in a header value so visitor-supplied text cannot
/// inject additional headers.
#[must_use]
pub fn sanitize_header_value(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '\r' | '\n') { ' ' } else { c })
        .collect()
}

/// Longest run of UTF-8 bytes per encoded-word; 45 bytes encode to 60
/// base64 characters, keeping each word within 75 characters.
const ENCODED_WORD_BYTES: usize = 45;

/// Base64 body lines are wrapped at this width.
const BASE64_LINE: usize = 76;

/// Encode a header value as RFC 2047 encoded-words when it is not plain
/// ASCII. Consecutive words are folded onto continuation lines.
#[must_use]
pub fn encode_header_value(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }

    let mut chunks = vec![String::new()];
    for c in value.chars() {
        if let Some(chunk) = chunks.last_mut()
            && chunk.len() + c.len_utf8() <= ENCODED_WORD_BYTES
        {
            chunk.push(c);
        } else {
            chunks.push(c.to_string());
        }
    }

    chunks
        .iter()
        .map(|chunk| format!("=?UTF-8?B?{}?=", STANDARD.encode(chunk)))
        .collect::<Vec<_>>()
        .join("\r\n ")
}

/// Base64 of `body`, wrapped into CRLF-terminated lines.
fn base64_lines(body: &str) -> String {
    let encoded = STANDARD.encode(body);
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE * 2 + 2);

    // base64 output is ASCII, so byte chunks are valid str slices
    for line in encoded.as_bytes().chunks(BASE64_LINE) {
        wrapped.push_str(&String::from_utf8_lossy(line));
        wrapped.push_str("\r\n");
    }
    wrapped
}

/// Rewrite every line ending as CRLF.
fn normalise_line_endings(body: &str) -> String {
    let mut normalised = String::with_capacity(body.len());
    for line in body.split_inclusive('\n') {
        let content = line.trim_end_matches(['\r', '\n']);
        normalised.push_str(content);
        if line.ends_with('\n') {
            normalised.push_str("\r\n");
        }
    }
    normalised
}

/// Builder for constructing plain-text email messages.
///
/// Header values are sanitized as they are added and the body's line
/// endings are normalised to CRLF. The built message is 7-bit clean:
/// non-ASCII subjects and custom header values become RFC 2047
/// encoded-words, and a non-ASCII body is sent base64 encoded.
///
/// # Examples
///
/// ```no_run
/// use courier_smtp::client::MessageBuilder;
///
/// let message = MessageBuilder::new()
///     .from("owner@example.com")
///     .to("owner@example.com")
///     .subject("Hello")
///     .body("This is the message body")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<String>,
    to: Vec<String>,
    reply_to: Option<String>,
    subject: Option<String>,
    date: Option<DateTime<Utc>>,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl MessageBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the From header.
    #[must_use]
    pub fn from(mut self, email: impl AsRef<str>) -> Self {
        self.from = Some(sanitize_header_value(email.as_ref()));
        self
    }

    /// Adds a recipient to the To header.
    #[must_use]
    pub fn to(mut self, email: impl AsRef<str>) -> Self {
        self.to.push(sanitize_header_value(email.as_ref()));
        self
    }

    /// Sets the Reply-To header.
    #[must_use]
    pub fn reply_to(mut self, email: impl AsRef<str>) -> Self {
        self.reply_to = Some(sanitize_header_value(email.as_ref()));
        self
    }

    /// Sets the Subject header.
    #[must_use]
    pub fn subject(mut self, subject: impl AsRef<str>) -> Self {
        self.subject = Some(sanitize_header_value(subject.as_ref()));
        self
    }

    /// Sets the Date header; defaults to the time of [`MessageBuilder::build`].
    #[must_use]
    pub const fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Adds a custom header. Headers are written in insertion order.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.headers.push((
            sanitize_header_value(name.as_ref()),
            sanitize_header_value(value.as_ref()),
        ));
        self
    }

    /// Sets the message body content.
    #[must_use]
    pub fn body(mut self, content: impl Into<String>) -> Self {
        self.body = Some(content.into());
        self
    }

    /// Builds the final email message.
    ///
    /// # Errors
    ///
    /// Returns an error if the From header or every recipient is missing.
    pub fn build(self) -> Result<String> {
        let from = self
            .from
            .ok_or_else(|| ClientError::MessageError("missing From header".to_string()))?;

        if self.to.is_empty() {
            return Err(ClientError::MessageError(
                "at least one To recipient is required".to_string(),
            ));
        }

        let date = self.date.unwrap_or_else(Utc::now);
        let mut message = String::with_capacity(1024);

        // Writing to a String cannot fail
        let _ = write!(message, "Date: {}\r\n", date.to_rfc2822());
        let _ = write!(message, "From: {from}\r\n");
        let _ = write!(message, "To: {}\r\n", self.to.join(", "));

        if let Some(reply_to) = &self.reply_to {
            let _ = write!(message, "Reply-To: {reply_to}\r\n");
        }

        if let Some(subject) = &self.subject {
            let _ = write!(message, "Subject: {}\r\n", encode_header_value(subject));
        }

        for (name, value) in &self.headers {
            let _ = write!(message, "{name}: {}\r\n", encode_header_value(value));
        }

        let body = normalise_line_endings(self.body.as_deref().unwrap_or_default());
        let encoding = if body.is_ascii() { "7bit" } else { "base64" };

        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/plain; charset=utf-8\r\n");
        let _ = write!(message, "Content-Transfer-Encoding: {encoding}\r\n");

        // Blank line between headers and body
        message.push_str("\r\n");

        if body.is_ascii() {
            message.push_str(&body);
        } else {
            message.push_str(&base64_lines(&body));
        }

        Ok(message)
    }
}
