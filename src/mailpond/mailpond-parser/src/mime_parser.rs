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

use crate::message::{Content, MessageParser, ParseError, ParsedMessage, Section};

/// [`MessageParser`] backed by the `mailparse` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MimeParser;

impl MessageParser for MimeParser {
    fn parse(&self, payload: &str) -> Result<ParsedMessage, ParseError> {
        let parsed = mailparse::parse_mail(payload.as_bytes())
            .map_err(|error| ParseError(error.to_string()))?;

        let headers = parsed
            .headers
            .iter()
            .map(|header| (header.get_key(), header.get_value()))
            .collect();

        // only the first level of parts is kept, as a multipart within a
        // multipart has no slot in the flat record
        let content = if parsed.ctype.mimetype.starts_with("multipart/") {
            Content::Multipart(parsed.subparts.iter().map(section_of).collect())
        } else {
            Content::Single(section_of(&parsed))
        };

        Ok(ParsedMessage { headers, content })
    }
}

fn section_of(part: &mailparse::ParsedMail<'_>) -> Section {
    Section {
        content_type: part.ctype.mimetype.to_lowercase(),
        text: part.get_body().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::MimeParser;
    use crate::message::{Content, MessageParser};
    use pretty_assertions::assert_eq;

    #[test]
    fn headers_keep_their_order() {
        let message = MimeParser
            .parse(concat!(
                "Subject: one\r\n",
                "X-Custom: two\r\n",
                "Subject: three\r\n",
                "\r\n",
                "body\r\n",
            ))
            .unwrap();

        assert_eq!(
            message.headers,
            vec![
                ("Subject".to_string(), "one".to_string()),
                ("X-Custom".to_string(), "two".to_string()),
                ("Subject".to_string(), "three".to_string()),
            ]
        );
        assert_eq!(message.header("subject"), Some("one"));
    }

    #[test]
    fn a_message_without_content_type_is_a_single_plain_section() {
        let message = MimeParser.parse("Subject: Hi\r\n\r\nhello\r\n").unwrap();

        match message.content {
            Content::Single(section) => {
                assert_eq!(section.content_type, "text/plain");
                assert_eq!(section.text.as_deref(), Some("hello\r\n"));
            }
            Content::Multipart(_) => panic!("expected a single section"),
        }
    }

    #[test]
    fn quoted_printable_sections_are_decoded() {
        let message = MimeParser
            .parse(concat!(
                "Content-Type: text/plain; charset=\"iso-8859-1\"\r\n",
                "Content-Transfer-Encoding: quoted-printable\r\n",
                "\r\n",
                "h=E9llo\r\n",
            ))
            .unwrap();

        match message.content {
            Content::Single(section) => {
                assert_eq!(section.text.unwrap().trim_end(), "h\u{e9}llo");
            }
            Content::Multipart(_) => panic!("expected a single section"),
        }
    }

    #[test]
    fn multiparts_are_flattened_to_their_top_level() {
        let message = MimeParser
            .parse(concat!(
                "Content-Type: multipart/alternative; boundary=\"frontier\"\r\n",
                "\r\n",
                "--frontier\r\n",
                "Content-Type: text/plain\r\n",
                "\r\n",
                "plain body\r\n",
                "--frontier\r\n",
                "Content-Type: text/html\r\n",
                "\r\n",
                "<p>html body</p>\r\n",
                "--frontier--\r\n",
            ))
            .unwrap();

        match message.content {
            Content::Multipart(sections) => {
                assert_eq!(sections.len(), 2);
                assert_eq!(sections[0].content_type, "text/plain");
                assert_eq!(sections[0].text.as_deref().map(str::trim_end), Some("plain body"));
                assert_eq!(sections[1].content_type, "text/html");
                assert_eq!(
                    sections[1].text.as_deref().map(str::trim_end),
                    Some("<p>html body</p>")
                );
            }
            Content::Single(_) => panic!("expected a multipart"),
        }
    }

    #[test]
    fn content_type_parameters_are_dropped() {
        let message = MimeParser
            .parse("Content-Type: text/html; charset=\"utf-8\"\r\n\r\n<p>hi</p>\r\n")
            .unwrap();

        match message.content {
            Content::Single(section) => assert_eq!(section.content_type, "text/html"),
            Content::Multipart(_) => panic!("expected a single section"),
        }
    }
}
