/*
 * mailpond development mail sink
 * Copyright (C) 2022 viridIT SAS
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or any later version.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * this program. If not, see https://www.gnu.org/licenses/.
 *
*/

/// The payload could not be read as a structured message.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// One leaf of a message, either the whole body or a top-level part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// media type, lowercase, without its parameters
    pub content_type: String,
    /// decoded text, [`None`] when the section could not be read
    pub text: Option<String>,
}

/// Shape of a parsed message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// the message is not a multipart, the section is its whole body
    Single(Section),
    /// top-level parts of a multipart, in order of appearance
    Multipart(Vec<Section>),
}

/// A message reduced to what the decomposer consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    /// header fields in order of appearance, names kept as received
    pub headers: Vec<(String, String)>,
    /// the body, flattened to one level of sections
    pub content: Content,
}

impl ParsedMessage {
    /// First value of the header `name`, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Anything able to turn a raw payload into a [`ParsedMessage`].
///
/// The decomposer only sees this trait, so its header and body rules can
/// be exercised without involving a real MIME parser.
pub trait MessageParser {
    /// Parse `payload` as an internet message.
    ///
    /// # Errors
    ///
    /// [`ParseError`] when the payload has no recognizable message
    /// structure. Implementations are expected to be lenient, a parse
    /// failure means the sink refuses the whole message.
    fn parse(&self, payload: &str) -> Result<ParsedMessage, ParseError>;
}
