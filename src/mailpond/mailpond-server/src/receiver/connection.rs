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
use mailpond_common::re::{anyhow, log};
use mailpond_common::ReplyCode;
use mailpond_config::Config;

/// One accepted client, and everything needed to talk to it.
pub struct Connection<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Send + Unpin,
{
    /// does the dialogue still go on?
    pub is_alive: bool,
    /// configuration of the whole sink
    pub config: std::sync::Arc<Config>,
    /// address of the peer
    pub client_addr: std::net::SocketAddr,
    /// the underlying stream, buffered on the read side
    pub io_stream: tokio::io::BufReader<S>,
}

impl<S> Connection<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Send + Unpin,
{
    ///
    pub fn new(
        client_addr: std::net::SocketAddr,
        config: std::sync::Arc<Config>,
        io_stream: S,
    ) -> Self {
        Self {
            is_alive: true,
            config,
            client_addr,
            io_stream: tokio::io::BufReader::new(io_stream),
        }
    }

    /// Open the dialogue with the `220` greeting.
    ///
    /// # Errors
    ///
    /// * the greeting could not be written to the client.
    pub async fn send_greeting(&mut self) -> anyhow::Result<()> {
        let greeting = ReplyCode::greeting(&self.config.server.domain);
        log::info!(target: log_channels::CONNECTION, "send=\"{greeting:?}\"");

        tokio::io::AsyncWriteExt::write_all(&mut self.io_stream, greeting.as_bytes())
            .await
            .map_err(anyhow::Error::new)
    }

    /// Send one reply code to the client.
    ///
    /// # Errors
    ///
    /// * the reply could not be written to the client.
    pub async fn send_code(&mut self, reply: ReplyCode) -> anyhow::Result<()> {
        if reply.is_error() {
            log::warn!(target: log_channels::CONNECTION, "send=\"{reply:?}\"");
        } else {
            log::info!(target: log_channels::CONNECTION, "send=\"{reply:?}\"");
        }

        tokio::io::AsyncWriteExt::write_all(&mut self.io_stream, reply.as_str().as_bytes())
            .await
            .map_err(anyhow::Error::new)
    }

    /// Read one line, stripped of its terminator. A bare `LF` is accepted
    /// the same as a `CRLF`, what sloppy development clients tend to send.
    ///
    /// Returns [`None`] when the client closed its side of the stream.
    ///
    /// # Errors
    ///
    /// * no line came within `timeout` ([`std::io::ErrorKind::TimedOut`]).
    /// * the stream broke.
    pub async fn read_line(
        &mut self,
        timeout: std::time::Duration,
    ) -> std::io::Result<Option<String>> {
        let mut buffer = Vec::new();

        let read = tokio::time::timeout(
            timeout,
            tokio::io::AsyncBufReadExt::read_until(&mut self.io_stream, b'\n', &mut buffer),
        )
        .await
        .map_err(|elapsed| std::io::Error::new(std::io::ErrorKind::TimedOut, elapsed))??;

        if read == 0 {
            return Ok(None);
        }

        // payload lines may carry arbitrary bytes, a lossy conversion keeps
        // the session alive instead of dropping the whole connection
        let mut line = String::from_utf8_lossy(&buffer).into_owned();
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        log::trace!(target: log_channels::CONNECTION, "read=\"{line}\"");
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::Connection;
    use mailpond_config::Config;
    use pretty_assertions::assert_eq;

    const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(1);

    fn connection(
        stream: tokio::io::DuplexStream,
    ) -> Connection<tokio::io::DuplexStream> {
        Connection::new(
            "127.0.0.1:53844".parse().unwrap(),
            std::sync::Arc::new(Config::default()),
            stream,
        )
    }

    #[tokio::test]
    async fn lines_lose_their_terminator_crlf_or_not() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut conn = connection(server);

        tokio::io::AsyncWriteExt::write_all(&mut client, b"NOOP\r\nnoop\nHELO")
            .await
            .unwrap();
        drop(client);

        assert_eq!(conn.read_line(TIMEOUT).await.unwrap().as_deref(), Some("NOOP"));
        assert_eq!(conn.read_line(TIMEOUT).await.unwrap().as_deref(), Some("noop"));
        // the stream ended mid-line, what was read is still a line
        assert_eq!(conn.read_line(TIMEOUT).await.unwrap().as_deref(), Some("HELO"));
        assert_eq!(conn.read_line(TIMEOUT).await.unwrap(), None);
    }

    #[tokio::test]
    async fn bytes_that_are_not_utf8_are_replaced_not_refused() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut conn = connection(server);

        tokio::io::AsyncWriteExt::write_all(&mut client, b"caf\xff\r\n")
            .await
            .unwrap();
        drop(client);

        assert_eq!(
            conn.read_line(TIMEOUT).await.unwrap(),
            Some(format!("caf{}", char::REPLACEMENT_CHARACTER))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn a_silent_client_times_out() {
        let (_client, server) = tokio::io::duplex(1024);
        let mut conn = connection(server);

        let error = conn
            .read_line(std::time::Duration::from_millis(100))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::TimedOut);
    }
}
