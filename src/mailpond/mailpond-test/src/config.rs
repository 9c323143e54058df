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

use mailpond_config::{
    Config, FieldServer, FieldServerApi, FieldServerLogs, FieldServerSMTP, FieldStorage,
};

/// Configuration the transcript tests run against.
///
/// `testserver.com` keeps the greeting predictable, the store path is
/// the sqlite in-memory marker so nothing lands on disk.
///
/// # Panics
///
/// * the hardcoded values are ill-formed
#[must_use]
pub fn local_test() -> Config {
    Config {
        version_requirement: semver::VersionReq::parse(">=0.1.0").unwrap(),
        server: FieldServer {
            domain: "testserver.com".to_string(),
            client_count_max: 16,
            logs: FieldServerLogs::default(),
            smtp: FieldServerSMTP {
                addr: "0.0.0.0:10025".parse().unwrap(),
                timeout_client: std::time::Duration::from_secs(5),
                message_size_max: 10_000_000,
            },
            api: FieldServerApi {
                addr: "0.0.0.0:10080".parse().unwrap(),
                static_dirpath: "./web".into(),
            },
        },
        storage: FieldStorage {
            filepath: ":memory:".into(),
        },
    }
}
