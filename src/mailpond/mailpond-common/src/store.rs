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

use crate::mail::Mail;

/// Errors produced by a [`MailStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// no record carries the requested identifier
    #[error("message not found")]
    NotFound,
    /// the underlying storage could not be reached
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// the storage engine rejected the operation
    #[error("storage engine error: {0}")]
    Engine(String),
}

/// Persistence backend for decomposed messages.
///
/// The submission pipeline and the query API only know this trait, so
/// engines can be swapped without touching either side.
#[async_trait::async_trait]
pub trait MailStore {
    /// Persist a record and hand back the identifier the store assigned.
    async fn save(&self, mail: &Mail) -> Result<String, StorageError>;

    /// Fetch a page of records, most recent date first.
    ///
    /// Records sharing a date come back newest insertion first, so
    /// repeated pagination never shuffles them.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Mail>, StorageError>;

    /// Fetch one record by the identifier [`MailStore::save`] assigned.
    ///
    /// # Errors
    ///
    /// [`StorageError::NotFound`] when the identifier matches nothing,
    /// including identifiers the store could never have assigned.
    async fn get_by_id(&self, id: &str) -> Result<Mail, StorageError>;
}
