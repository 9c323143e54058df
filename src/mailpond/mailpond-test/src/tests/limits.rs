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

use crate::receiver::DiscardHandler;
use crate::{config, test_receiver};
use mailpond_server::{handle_connection, Connection, Server};
use mailpond_storage::SqliteStore;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn an_oversized_payload_ends_the_dialogue_with_a_552() {
    let mut config = config::local_test();
    config.server.smtp.message_size_max = 32;

    test_receiver! {
        with_config => config,
        [
            "DATA\r\n",
            "0123456789012345678901234567890123456789\r\n",
        ]
        .concat(),
        [
            "220 testserver.com Service ready\r\n",
            "354 End data with <CR><LF>.<CR><LF>\r\n",
            "552 Message size exceeds fixed maximum\r\n",
        ]
        .concat()
    }
    .unwrap();
}

#[tokio::test]
async fn extra_clients_are_refused_while_the_cap_is_reached() {
    let mut config = config::local_test();
    config.server.client_count_max = 0;

    let socket = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let store = std::sync::Arc::new(SqliteStore::open_in_memory().unwrap());
    let server = Server::new(std::sync::Arc::new(config), socket, store).unwrap();
    let addr = server.addr().unwrap();

    tokio::spawn(server.listen_and_serve());

    let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();

    let mut response = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut client, &mut response)
        .await
        .unwrap();
    assert_eq!(response, "554 Cannot process connection, closing\r\n");
}

#[tokio::test(start_paused = true)]
async fn a_silent_client_is_disconnected_with_a_451() {
    let mut config = config::local_test();
    config.server.smtp.timeout_client = std::time::Duration::from_millis(200);

    let (mut client, server_stream) = tokio::io::duplex(1024);
    let mut conn = Connection::new(
        "127.0.0.1:53844".parse().unwrap(),
        std::sync::Arc::new(config),
        server_stream,
    );

    let session = tokio::spawn(async move {
        handle_connection(&mut conn, &mut DiscardHandler {}).await
    });

    let mut transcript = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut client, &mut transcript)
        .await
        .unwrap();
    assert_eq!(
        transcript,
        [
            "220 testserver.com Service ready\r\n",
            "451 Timeout - closing connection.\r\n",
        ]
        .concat()
    );

    session.await.unwrap().unwrap();
}
