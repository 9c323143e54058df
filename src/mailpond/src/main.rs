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

use mailpond::{Args, Commands};
use mailpond_common::re::anyhow::{self, Context};
use mailpond_common::re::serde_json;
use mailpond_common::MailStore;
use mailpond_config::Config;
use mailpond_server::Server;
use mailpond_storage::SqliteStore;

fn socket_bind_anyhow<A: std::net::ToSocketAddrs + std::fmt::Debug>(
    addr: A,
) -> anyhow::Result<std::net::TcpListener> {
    std::net::TcpListener::bind(&addr)
        .with_context(|| format!("Failed to bind socket on addr: '{addr:?}'"))
}

fn init_logs(config: &Config) {
    // the toml levels drive the filter, RUST_LOG overrides the whole map
    let directives = config
        .server
        .logs
        .level
        .iter()
        .map(|(target, level)| {
            if target == "default" {
                level.to_string().to_lowercase()
            } else {
                format!("{target}={level}").to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join(",");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directives)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = <Args as clap::Parser>::parse();

    let config = args.config.as_ref().map_or_else(
        || Ok(Config::default()),
        |config| {
            std::fs::read_to_string(config)
                .context(format!("Cannot read file '{config}'"))
                .and_then(|f| Config::from_toml(&f).context("File contains format error"))
                .context("Cannot parse the configuration")
        },
    )?;

    if let Some(Commands::ConfigShow) = args.command {
        println!(
            "{}",
            serde_json::to_string_pretty(&config)
                .context("Failed to serialize the configuration")?
        );
        return Ok(());
    }

    init_logs(&config);

    let store = std::sync::Arc::new(SqliteStore::open(&config.storage.filepath).with_context(
        || {
            format!(
                "Cannot open the store at '{}'",
                config.storage.filepath.display()
            )
        },
    )?);

    let smtp_socket = socket_bind_anyhow(config.server.smtp.addr)?;
    let api_socket = socket_bind_anyhow(config.server.api.addr)?;

    let config = std::sync::Arc::new(config);
    let store: std::sync::Arc<dyn MailStore + Send + Sync> = store;

    let server = Server::new(config.clone(), smtp_socket, store.clone())?;

    tokio::select! {
        result = server.listen_and_serve() => result,
        result = mailpond_api::listen_and_serve(api_socket, config, store) => result,
    }
}
