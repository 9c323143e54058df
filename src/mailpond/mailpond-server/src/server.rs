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
use crate::receiver::{handle_connection, Connection, MailHandler};
use mailpond_common::re::{anyhow, log};
use mailpond_common::{MailStore, ReplyCode};
use mailpond_config::Config;

/// The submission side of the sink.
pub struct Server {
    listener: tokio::net::TcpListener,
    config: std::sync::Arc<Config>,
    store: std::sync::Arc<dyn MailStore + Send + Sync>,
}

impl Server {
    /// Take ownership of a bound socket and make it the submission endpoint.
    ///
    /// # Errors
    ///
    /// * the socket could not be registered with the runtime.
    pub fn new(
        config: std::sync::Arc<Config>,
        socket: std::net::TcpListener,
        store: std::sync::Arc<dyn MailStore + Send + Sync>,
    ) -> anyhow::Result<Self> {
        socket.set_nonblocking(true)?;

        Ok(Self {
            listener: tokio::net::TcpListener::from_std(socket)?,
            config,
            store,
        })
    }

    /// Address the submission endpoint listens on.
    ///
    /// # Errors
    ///
    /// * the socket is gone.
    pub fn addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept clients forever, one task per connection.
    ///
    /// When `server.client_count_max` is reached, extra clients are
    /// refused with a `554` before their dialogue even starts. A failed
    /// accept is logged and the loop keeps going.
    ///
    /// # Errors
    ///
    /// * the listener broke.
    pub async fn listen_and_serve(self) -> anyhow::Result<()> {
        let client_counter = std::sync::Arc::new(std::sync::atomic::AtomicI64::new(0));

        log::info!(
            target: log_channels::SERVER,
            "SMTP server listening on {}",
            self.listener.local_addr()?
        );

        loop {
            let (mut stream, client_addr) = match self.listener.accept().await {
                Ok(client) => client,
                Err(error) => {
                    log::error!(
                        target: log_channels::SERVER,
                        "Error accepting connection: {error}"
                    );
                    continue;
                }
            };

            log::info!(target: log_channels::SERVER, "Connection from: {client_addr}");

            if self.config.server.client_count_max != -1
                && client_counter.load(std::sync::atomic::Ordering::SeqCst)
                    >= self.config.server.client_count_max
            {
                if let Err(error) = tokio::io::AsyncWriteExt::write_all(
                    &mut stream,
                    ReplyCode::ConnectionMaxReached.as_str().as_bytes(),
                )
                .await
                {
                    log::warn!(target: log_channels::SERVER, "{error}");
                }

                if let Err(error) = tokio::io::AsyncWriteExt::shutdown(&mut stream).await {
                    log::warn!(target: log_channels::SERVER, "{error}");
                }

                continue;
            }

            client_counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

            let session = Self::run_session(
                stream,
                client_addr,
                self.config.clone(),
                self.store.clone(),
            );
            let client_counter_copy = client_counter.clone();

            tokio::spawn(async move {
                let _ = session.await;
                client_counter_copy.fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
            });
        }
    }

    async fn run_session(
        stream: tokio::net::TcpStream,
        client_addr: std::net::SocketAddr,
        config: std::sync::Arc<Config>,
        store: std::sync::Arc<dyn MailStore + Send + Sync>,
    ) -> anyhow::Result<()> {
        let begin = std::time::SystemTime::now();
        log::info!(target: log_channels::SERVER, "Handling client: {client_addr}");

        let mut conn = Connection::new(client_addr, config, stream);
        let mut handler = MailHandler::new(store);

        handle_connection(&mut conn, &mut handler)
            .await
            .map(|()| {
                log::info!(
                    target: log_channels::SERVER,
                    "{{ elapsed: {:?} }} Connection {} closed cleanly",
                    begin.elapsed(),
                    client_addr,
                );
            })
            .map_err(|error| {
                log::error!(
                    target: log_channels::SERVER,
                    "{{ elapsed: {:?} }} Connection {} closed with an error: {}",
                    begin.elapsed(),
                    client_addr,
                    error,
                );
                error
            })
    }
}
