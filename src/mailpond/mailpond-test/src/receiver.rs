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

use std::io::Write;

use mailpond_common::re::anyhow;
use mailpond_common::{Envelop, Mail, MailStore, ReplyCode, StorageError};
use mailpond_config::Config;
use mailpond_server::{handle_connection, Connection, OnMessage};

/// A type implementing Write+Read to emulate sockets
pub struct Mock<'a, T: std::io::Write + std::io::Read> {
    read_cursor: T,
    write_cursor: std::io::Cursor<&'a mut Vec<u8>>,
}

impl<'a, T: std::io::Write + std::io::Read> Mock<'a, T> {
    /// Create an new instance
    pub fn new(read: T, write: &'a mut Vec<u8>) -> Self {
        Self {
            read_cursor: read,
            write_cursor: std::io::Cursor::new(write),
        }
    }
}

impl<T: std::io::Write + std::io::Read + Unpin> tokio::io::AsyncRead for Mock<'_, T> {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        _: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::result::Result<(), std::io::Error>> {
        std::task::Poll::Ready(
            self.as_mut()
                .read_cursor
                .read(unsafe {
                    &mut *(buf.unfilled_mut() as *mut [std::mem::MaybeUninit<u8>] as *mut [u8])
                })
                .map(|i| {
                    buf.set_filled(i);
                }),
        )
    }
}

impl<T: std::io::Write + std::io::Read + Unpin> tokio::io::AsyncWrite for Mock<'_, T> {
    fn poll_write(
        mut self: std::pin::Pin<&mut Self>,
        _: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> std::task::Poll<Result<usize, std::io::Error>> {
        std::task::Poll::Ready(self.write_cursor.write(buf))
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        _: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), std::io::Error>> {
        std::task::Poll::Ready(self.write_cursor.flush())
    }

    fn poll_shutdown(
        self: std::pin::Pin<&mut Self>,
        _: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), std::io::Error>> {
        std::task::Poll::Ready(Ok(()))
    }
}

/// used for testing, acknowledges every capture and stores nothing.
pub struct DiscardHandler;

#[async_trait::async_trait]
impl OnMessage for DiscardHandler {
    async fn on_message(&mut self, _envelop: Envelop, _payload: String) -> ReplyCode {
        ReplyCode::MessageAccepted
    }
}

/// used for testing, a store where every operation fails.
pub struct FailingStore;

#[async_trait::async_trait]
impl MailStore for FailingStore {
    async fn save(&self, _mail: &Mail) -> Result<String, StorageError> {
        Err(StorageError::Engine("refused by the test store".to_string()))
    }

    async fn list(&self, _limit: i64, _offset: i64) -> Result<Vec<Mail>, StorageError> {
        Err(StorageError::Engine("refused by the test store".to_string()))
    }

    async fn get_by_id(&self, _id: &str) -> Result<Mail, StorageError> {
        Err(StorageError::Engine("refused by the test store".to_string()))
    }
}

/// run a connection and assert output produced by the sink and @expected_output
///
/// # Errors
///
/// * the outcome of [`handle_connection`]
///
/// # Panics
///
/// * argument provided are ill-formed
pub async fn test_receiver_inner<M>(
    address: &str,
    handler: &mut M,
    smtp_input: &[u8],
    expected_output: &[u8],
    config: std::sync::Arc<Config>,
) -> anyhow::Result<()>
where
    M: OnMessage + Send,
{
    let mut written_data = Vec::new();
    let mock = Mock::new(std::io::Cursor::new(smtp_input.to_vec()), &mut written_data);
    let mut conn = Connection::new(address.parse().unwrap(), config, mock);

    let result = handle_connection(&mut conn, handler).await;
    tokio::io::AsyncWriteExt::flush(&mut conn.io_stream)
        .await
        .unwrap();

    pretty_assertions::assert_eq!(
        std::str::from_utf8(expected_output),
        std::str::from_utf8(&written_data),
    );

    result
}

/// Call test_receiver_inner
#[macro_export]
macro_rules! test_receiver {
    ($input:expr, $output:expr) => {
        test_receiver! {
            on_message => &mut $crate::receiver::DiscardHandler {},
            with_config => $crate::config::local_test(),
            $input,
            $output
        }
    };
    (on_message => $handler:expr, $input:expr, $output:expr) => {
        test_receiver! {
            on_message => $handler,
            with_config => $crate::config::local_test(),
            $input,
            $output
        }
    };
    (with_config => $config:expr, $input:expr, $output:expr) => {
        test_receiver! {
            on_message => &mut $crate::receiver::DiscardHandler {},
            with_config => $config,
            $input,
            $output
        }
    };
    (on_message => $handler:expr, with_config => $config:expr, $input:expr, $output:expr) => {
        $crate::receiver::test_receiver_inner(
            "127.0.0.1:0",
            $handler,
            $input.as_bytes(),
            $output.as_bytes(),
            std::sync::Arc::new($config),
        )
        .await
    };
}
