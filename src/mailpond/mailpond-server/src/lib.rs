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

//! mailpond submission endpoint
//!
//! A deliberately small SMTP dialect: every command is accepted in any
//! order, nothing is ever relayed, and each completed `DATA` capture is
//! handed to an [`OnMessage`] hook which decomposes and persists it.

#![doc(html_no_source)]
#![deny(missing_docs)]
//
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
//
#![allow(clippy::doc_markdown)]

mod receiver;
mod server;

pub use receiver::{handle_connection, Connection, MailHandler, OnMessage, Session, SessionResult};
pub use server::Server;

mod log_channels {
    pub const SERVER: &str = "smtp::server";
    pub const CONNECTION: &str = "smtp::connection";
    pub const RECEIVER: &str = "smtp::receiver";
}
