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

//! mailpond message decomposition
//!
//! Turns a captured payload into a flat [`mailpond_common::Mail`]
//! record: a handful of headers plus the first level of text bodies.
//! Anything deeper (nested multiparts, attachments) is deliberately
//! ignored, the record is meant for quick inspection, not for rebuilding
//! the original message.

#![doc(html_no_source)]
#![deny(missing_docs)]
//
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
//
#![allow(clippy::doc_markdown)]

mod decompose;
mod message;
mod mime_parser;

pub use decompose::{decompose, DecomposeError};
pub use message::{Content, MessageParser, ParseError, ParsedMessage, Section};
pub use mime_parser::MimeParser;
