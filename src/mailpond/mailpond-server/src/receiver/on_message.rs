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

use crate::log_channels;
use mailpond_common::re::log;
use mailpond_common::{Envelop, MailStore, ReplyCode};
use mailpond_parser::{decompose, MimeParser};

/// Hook awaited when a payload capture completes.
///
/// The reply it hands back closes the `DATA` step, so a hook refusing a
/// message is how the client learns about it.
#[async_trait::async_trait]
pub trait OnMessage {
    /// Process one captured message.
    async fn on_message(&mut self, envelop: Envelop, payload: String) -> ReplyCode;
}

/// Production hook: decompose the payload and persist the record.
pub struct MailHandler {
    parser: MimeParser,
    store: std::sync::Arc<dyn MailStore + Send + Sync>,
}

impl MailHandler {
    ///
    #[must_use]
    pub fn new(store: std::sync::Arc<dyn MailStore + Send + Sync>) -> Self {
        Self {
            parser: MimeParser,
            store,
        }
    }
}

#[async_trait::async_trait]
impl OnMessage for MailHandler {
    async fn on_message(&mut self, envelop: Envelop, payload: String) -> ReplyCode {
        let mail = match decompose(&self.parser, &envelop, &payload) {
            Ok(mail) => mail,
            Err(error) => {
                log::error!(
                    target: log_channels::RECEIVER,
                    "error processing message: {error}"
                );
                return ReplyCode::ProcessingFailed;
            }
        };

        match self.store.save(&mail).await {
            Ok(id) => {
                log::info!(
                    target: log_channels::RECEIVER,
                    "message stored: id={id} from={:?} to={:?} subject={:?}",
                    mail.from,
                    mail.to,
                    mail.subject,
                );
                ReplyCode::MessageAccepted
            }
            Err(error) => {
                log::error!(
                    target: log_channels::RECEIVER,
                    "error processing message: {error}"
                );
                ReplyCode::ProcessingFailed
            }
        }
    }
}
