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

/// Replies the submission endpoint can send back to a client.
///
/// The sink speaks a minimal dialect, so replies are fixed strings
/// rather than configurable templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCode {
    /// answer to a HELO or EHLO command
    Helo,
    /// generic acknowledgment (MAIL, RCPT, RSET, NOOP)
    Ok,
    /// the client may start sending the payload
    DataStart,
    /// the message went through the whole pipeline
    MessageAccepted,
    /// decomposition or persistence of the message failed
    ProcessingFailed,
    /// answer to QUIT, the connection closes right after
    Farewell,
    /// the command keyword was not recognized
    Unrecognized,
    /// the client stayed silent for too long
    Timeout,
    /// the payload grew over `server.smtp.message_size_max`
    MessageSizeExceeded,
    /// too many clients are already connected
    ConnectionMaxReached,
}

impl ReplyCode {
    /// Wire representation of the reply, `<CRLF>` included.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Helo => "250 Hello\r\n",
            Self::Ok => "250 OK\r\n",
            Self::DataStart => "354 End data with <CR><LF>.<CR><LF>\r\n",
            Self::MessageAccepted => "250 OK: Message received\r\n",
            Self::ProcessingFailed => "550 Error processing message\r\n",
            Self::Farewell => "221 Bye\r\n",
            Self::Unrecognized => "500 Command not recognized\r\n",
            Self::Timeout => "451 Timeout - closing connection.\r\n",
            Self::MessageSizeExceeded => "552 Message size exceeds fixed maximum\r\n",
            Self::ConnectionMaxReached => "554 Cannot process connection, closing\r\n",
        }
    }

    /// Greeting sent when a connection opens, before any command.
    #[must_use]
    pub fn greeting(domain: &str) -> String {
        format!("220 {domain} Service ready\r\n")
    }

    /// Is the reply a 4yz or 5yz code?
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            Self::ProcessingFailed
                | Self::Unrecognized
                | Self::Timeout
                | Self::MessageSizeExceeded
                | Self::ConnectionMaxReached
        )
    }
}
