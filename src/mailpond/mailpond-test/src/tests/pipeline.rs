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

use crate::config;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use mailpond_api::ApiState;
use mailpond_common::re::serde_json;
use mailpond_server::Server;
use mailpond_storage::SqliteStore;
use pretty_assertions::assert_eq;

/// Submit a message with a stock SMTP client and read it back over HTTP.
#[tokio::test]
async fn a_submitted_message_shows_up_in_the_api() {
    let store = std::sync::Arc::new(SqliteStore::open_in_memory().unwrap());

    let socket = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let server = Server::new(
        std::sync::Arc::new(config::local_test()),
        socket,
        store.clone(),
    )
    .unwrap();
    let port = server.addr().unwrap().port();

    tokio::spawn(server.listen_and_serve());

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("127.0.0.1")
        .port(port)
        .build();

    let email = Message::builder()
        .from("John <john@doe.com>".parse().unwrap())
        .to("Green <green@foo.net>".parse().unwrap())
        .subject("ties")
        .body(String::from("hello"))
        .unwrap();

    mailer.send(email).await.unwrap();

    let app = mailpond_api::router(ApiState::new(store), std::path::Path::new("./web"));
    let response = tower::ServiceExt::oneshot(
        app,
        axum::http::Request::builder()
            .uri("/api/messages")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let body = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let mails: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let mails = mails.as_array().unwrap();
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0]["id"], serde_json::json!("1"));
    assert_eq!(mails[0]["from"], serde_json::json!("john@doe.com"));
    assert_eq!(mails[0]["to"], serde_json::json!("green@foo.net"));
    assert_eq!(mails[0]["subject"], serde_json::json!("ties"));
    // the exact trailing line ending is the client's business
    assert_eq!(mails[0]["text_body"].as_str().unwrap().trim_end(), "hello");
    assert_eq!(mails[0]["html_body"], serde_json::json!(""));
}
