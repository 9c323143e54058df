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

use crate::re::chrono;

/// A message decomposed into its exploitable pieces.
///
/// This is the record the sink persists and serves back over the query
/// API. Dates are normalized to UTC so that stores can order records by
/// comparing their serialized form.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Mail {
    /// store-assigned identifier, [`None`] until the record is persisted
    pub id: Option<String>,
    /// value of the `Message-ID` header, empty when absent
    pub message_id: String,
    /// envelope sender captured from `MAIL FROM`
    pub from: String,
    /// envelope recipient captured from `RCPT TO`
    pub to: String,
    /// value of the `Subject` header, empty when absent
    pub subject: String,
    /// value of the `Date` header, or the reception time when the header
    /// is missing or unparseable
    pub date: chrono::DateTime<chrono::Utc>,
    /// `text/plain` body, empty when the message carries none
    pub text_body: String,
    /// `text/html` body, empty when the message carries none
    pub html_body: String,
}

#[cfg(test)]
mod tests {
    use super::Mail;
    use crate::re::{chrono, serde_json};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample() -> Mail {
        Mail {
            id: Some("1".to_string()),
            message_id: "<uid@domain.tld>".to_string(),
            from: "john@doe.com".to_string(),
            to: "green@foo.net".to_string(),
            subject: "ties".to_string(),
            date: chrono::Utc.with_ymd_and_hms(2022, 8, 5, 12, 30, 0).unwrap(),
            text_body: "hello\r\n".to_string(),
            html_body: String::new(),
        }
    }

    #[test]
    fn json_keys_are_stable() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "id",
            "message_id",
            "from",
            "to",
            "subject",
            "date",
            "text_body",
            "html_body",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert_eq!(object["date"], serde_json::json!("2022-08-05T12:30:00Z"));
    }

    #[test]
    fn json_round_trip() {
        let mail = sample();
        let raw = serde_json::to_string(&mail).unwrap();
        assert_eq!(serde_json::from_str::<Mail>(&raw).unwrap(), mail);
    }
}
