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

mod connection;
mod on_message;
mod session;

pub use connection::Connection;
pub use on_message::{MailHandler, OnMessage};
pub use session::{Session, SessionResult};

use mailpond_common::re::anyhow;
use mailpond_common::ReplyCode;

/// Run one whole submission dialogue over an established stream.
///
/// The dialogue ends when the client sends `QUIT`, goes away, stays
/// silent past `server.smtp.timeout_client`, or pushes a payload over
/// `server.smtp.message_size_max`. None of those ends is an error, the
/// returned `Err` only covers a broken stream.
///
/// # Errors
///
/// * a reply could not be written, or a read failed for another reason
///   than a timeout or an end of stream.
pub async fn handle_connection<S, M>(
    conn: &mut Connection<S>,
    handler: &mut M,
) -> anyhow::Result<()>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Send + Unpin,
    M: OnMessage + Send,
{
    conn.send_greeting().await?;

    let mut session = Session::new(conn.config.server.smtp.message_size_max);

    while conn.is_alive {
        let line = match conn.read_line(conn.config.server.smtp.timeout_client).await {
            Ok(Some(line)) => line,
            // the client went away without a QUIT, nothing left to do
            Ok(None) => break,
            Err(error) if error.kind() == std::io::ErrorKind::TimedOut => {
                conn.send_code(ReplyCode::Timeout).await?;
                break;
            }
            Err(error) => return Err(anyhow::Error::new(error)),
        };

        match session.receive_line(&line) {
            SessionResult::Nothing => {}
            SessionResult::Reply(reply) => conn.send_code(reply).await?,
            SessionResult::ReplyThenClose(reply) => {
                conn.send_code(reply).await?;
                conn.is_alive = false;
            }
            SessionResult::Message(envelop, payload) => {
                let reply = handler.on_message(envelop, payload).await;
                conn.send_code(reply).await?;
            }
        }
    }

    Ok(())
}
