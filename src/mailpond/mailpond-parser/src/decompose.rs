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

use crate::message::{Content, MessageParser, ParseError, ParsedMessage};
use mailpond_common::re::chrono;
use mailpond_common::{Envelop, Mail};

/// The payload could not be decomposed into a [`Mail`] record.
#[derive(Debug, thiserror::Error)]
pub enum DecomposeError {
    /// the payload has no recognizable message structure
    #[error("could not parse the message: {0}")]
    Parse(#[from] ParseError),
    /// the message is a single section whose body could not be read
    #[error("could not read the message body")]
    UnreadableBody,
}

/// Turn a captured payload into the record the sink persists.
///
/// Bodies are routed by media type: the last `text/plain` top-level
/// section wins the text slot, the last `text/html` one the html slot.
/// In a multipart, a section that cannot be read is skipped. When the
/// whole message is one unreadable section there is nothing to keep, so
/// the decomposition fails.
///
/// # Errors
///
/// [`DecomposeError`], the caller is expected to refuse the message.
pub fn decompose(
    parser: &impl MessageParser,
    envelop: &Envelop,
    payload: &str,
) -> Result<Mail, DecomposeError> {
    let message = parser.parse(payload)?;

    let subject = message.header("Subject").unwrap_or_default().to_string();
    let message_id = message.header("Message-ID").unwrap_or_default().to_string();
    let date = capture_date(&message);

    let (text_body, html_body) = extract_bodies(message.content)?;

    Ok(Mail {
        id: None,
        message_id,
        from: envelop.from.clone(),
        to: envelop.to.clone(),
        subject,
        date,
        text_body,
        html_body,
    })
}

fn capture_date(message: &ParsedMessage) -> chrono::DateTime<chrono::Utc> {
    message
        .header("Date")
        .and_then(parse_date)
        .unwrap_or_else(chrono::Utc::now)
}

/// `Date` headers come in two flavors, a numeric offset or an obsolete
/// zone name. chrono resolves the named ones the way RFC 2822 asks,
/// unknown names falling back to +0000.
fn parse_date(value: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_str(value, "%a, %d %b %Y %H:%M:%S %z")
        .or_else(|_| chrono::DateTime::parse_from_rfc2822(value))
        .ok()
        .map(|date| date.with_timezone(&chrono::Utc))
}

fn extract_bodies(content: Content) -> Result<(String, String), DecomposeError> {
    let mut text_body = String::new();
    let mut html_body = String::new();

    match content {
        Content::Single(section) => {
            let body = section.text.ok_or(DecomposeError::UnreadableBody)?;
            if section.content_type.starts_with("text/html") {
                html_body = body;
            } else {
                text_body = body;
            }
        }
        Content::Multipart(sections) => {
            for section in sections {
                let Some(body) = section.text else { continue };
                if section.content_type.starts_with("text/plain") {
                    text_body = body;
                } else if section.content_type.starts_with("text/html") {
                    html_body = body;
                }
            }
        }
    }

    Ok((text_body, html_body))
}
