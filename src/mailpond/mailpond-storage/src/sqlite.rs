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
use mailpond_common::re::log;
use mailpond_common::{Mail, MailStore, StorageError};

const CREATE_TABLE: &str = concat!(
    "CREATE TABLE IF NOT EXISTS emails (",
    "id INTEGER PRIMARY KEY AUTOINCREMENT, ",
    "message_id TEXT, ",
    "sender TEXT, ",
    "recipient TEXT, ",
    "subject TEXT, ",
    "date DATETIME, ",
    "text_body TEXT, ",
    "html_body TEXT",
    ")"
);

const FIELDS: &str = "id, message_id, sender, recipient, subject, date, text_body, html_body";

/// [`MailStore`] engine backed by a local sqlite database.
///
/// Dates are stored as ISO 8601 UTC strings, so `ORDER BY date` compares
/// them chronologically. The connection is guarded by a mutex, queries
/// are short-lived and never held across an await point.
pub struct SqliteStore {
    connection: std::sync::Mutex<rusqlite::Connection>,
}

impl SqliteStore {
    /// Open, or create, the database at `filepath`.
    ///
    /// # Errors
    ///
    /// [`StorageError::Engine`] when the file cannot be opened or the
    /// schema cannot be installed.
    pub fn open(filepath: &std::path::Path) -> Result<Self, StorageError> {
        let connection = rusqlite::Connection::open(filepath)
            .map_err(|error| StorageError::Engine(error.to_string()))?;

        log::debug!(
            target: log_channels::STORE,
            "opened database at '{}'",
            filepath.display()
        );

        Self::prepare(connection)
    }

    /// Open a throwaway in-memory database, gone when the store drops.
    ///
    /// # Errors
    ///
    /// [`StorageError::Engine`] when the schema cannot be installed.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let connection = rusqlite::Connection::open_in_memory()
            .map_err(|error| StorageError::Engine(error.to_string()))?;

        Self::prepare(connection)
    }

    fn prepare(connection: rusqlite::Connection) -> Result<Self, StorageError> {
        connection
            .execute(CREATE_TABLE, [])
            .map_err(|error| StorageError::Engine(error.to_string()))?;

        Ok(Self {
            connection: std::sync::Mutex::new(connection),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, rusqlite::Connection>, StorageError> {
        self.connection
            .lock()
            .map_err(|_| StorageError::Engine("database mutex poisoned".to_string()))
    }
}

fn row_to_mail(row: &rusqlite::Row<'_>) -> rusqlite::Result<Mail> {
    Ok(Mail {
        id: Some(row.get::<_, i64>(0)?.to_string()),
        message_id: row.get(1)?,
        from: row.get(2)?,
        to: row.get(3)?,
        subject: row.get(4)?,
        date: row.get(5)?,
        text_body: row.get(6)?,
        html_body: row.get(7)?,
    })
}

#[async_trait::async_trait]
impl MailStore for SqliteStore {
    async fn save(&self, mail: &Mail) -> Result<String, StorageError> {
        let connection = self.lock()?;

        connection
            .execute(
                concat!(
                    "INSERT INTO emails ",
                    "(message_id, sender, recipient, subject, date, text_body, html_body) ",
                    "VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                rusqlite::params![
                    mail.message_id,
                    mail.from,
                    mail.to,
                    mail.subject,
                    mail.date,
                    mail.text_body,
                    mail.html_body,
                ],
            )
            .map_err(|error| StorageError::Engine(error.to_string()))?;

        Ok(connection.last_insert_rowid().to_string())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Mail>, StorageError> {
        let connection = self.lock()?;

        let mut statement = connection
            .prepare(&format!(
                "SELECT {FIELDS} FROM emails ORDER BY date DESC, id DESC LIMIT ?1 OFFSET ?2"
            ))
            .map_err(|error| StorageError::Engine(error.to_string()))?;

        let rows = statement
            .query_map(rusqlite::params![limit, offset], row_to_mail)
            .map_err(|error| StorageError::Engine(error.to_string()))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|error| StorageError::Engine(error.to_string()))
    }

    async fn get_by_id(&self, id: &str) -> Result<Mail, StorageError> {
        // identifiers are stringified rowids, anything else matches nothing
        let Ok(id) = id.parse::<i64>() else {
            return Err(StorageError::NotFound);
        };

        let connection = self.lock()?;

        connection
            .query_row(
                &format!("SELECT {FIELDS} FROM emails WHERE id = ?1"),
                [id],
                row_to_mail,
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => StorageError::NotFound,
                error => StorageError::Engine(error.to_string()),
            })
    }
}
