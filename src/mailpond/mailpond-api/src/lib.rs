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

//! mailpond query endpoint
//!
//! Read-only HTTP view over the store: list captured messages, fetch one
//! by identifier, and serve a static directory for everything else so a
//! small inspection page can sit next to the data.

#![doc(html_no_source)]
#![deny(missing_docs)]
//
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
//
#![allow(clippy::doc_markdown)]

mod handlers;

pub use handlers::ApiState;

use mailpond_common::re::{anyhow, log};
use mailpond_common::MailStore;
use mailpond_config::Config;

/// Assemble the query endpoint router.
///
/// Anything not under `/api` falls back on the static directory, a
/// request for a file that is not there is a plain `404`.
#[must_use]
pub fn router(state: ApiState, static_dirpath: &std::path::Path) -> axum::Router {
    axum::Router::new()
        .route("/api/messages", axum::routing::get(handlers::list_messages))
        .route(
            "/api/messages/{id}",
            axum::routing::get(handlers::get_message),
        )
        .fallback_service(tower_http::services::ServeDir::new(static_dirpath))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Take ownership of a bound socket and serve the query endpoint on it.
///
/// # Errors
///
/// * the socket could not be registered with the runtime.
/// * the server broke while running.
pub async fn listen_and_serve(
    socket: std::net::TcpListener,
    config: std::sync::Arc<Config>,
    store: std::sync::Arc<dyn MailStore + Send + Sync>,
) -> anyhow::Result<()> {
    socket.set_nonblocking(true)?;
    let listener = tokio::net::TcpListener::from_std(socket)?;

    log::info!(
        target: log_channels::API,
        "HTTP server listening on {}",
        listener.local_addr()?
    );

    let app = router(ApiState::new(store), &config.server.api.static_dirpath);

    axum::serve(listener, app).await.map_err(anyhow::Error::new)
}

mod log_channels {
    pub const API: &str = "api";
}
