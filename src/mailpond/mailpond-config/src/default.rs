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

use crate::config::{
    Config, FieldServer, FieldServerApi, FieldServerLogs, FieldServerSMTP, FieldStorage,
};

impl Default for Config {
    fn default() -> Self {
        Self {
            version_requirement: semver::VersionReq::parse(">=0.1.0, <1.0.0").unwrap(),
            server: FieldServer::default(),
            storage: FieldStorage::default(),
        }
    }
}

impl Default for FieldServer {
    fn default() -> Self {
        Self {
            domain: Self::hostname(),
            client_count_max: Self::default_client_count_max(),
            logs: FieldServerLogs::default(),
            smtp: FieldServerSMTP::default(),
            api: FieldServerApi::default(),
        }
    }
}

impl FieldServer {
    pub(crate) fn hostname() -> String {
        hostname::get().unwrap().to_str().unwrap().to_string()
    }

    pub(crate) const fn default_client_count_max() -> i64 {
        -1
    }
}

impl Default for FieldServerLogs {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

impl FieldServerLogs {
    pub(crate) fn default_level() -> std::collections::BTreeMap<String, log::LevelFilter> {
        std::collections::BTreeMap::from([("default".to_string(), log::LevelFilter::Info)])
    }
}

impl Default for FieldServerSMTP {
    fn default() -> Self {
        Self {
            addr: Self::default_addr(),
            timeout_client: Self::default_timeout_client(),
            message_size_max: Self::default_message_size_max(),
        }
    }
}

impl FieldServerSMTP {
    pub(crate) fn default_addr() -> std::net::SocketAddr {
        "0.0.0.0:1025".parse().expect("valid address")
    }

    pub(crate) const fn default_timeout_client() -> std::time::Duration {
        std::time::Duration::from_secs(5 * 60)
    }

    pub(crate) const fn default_message_size_max() -> usize {
        10_000_000
    }
}

impl Default for FieldServerApi {
    fn default() -> Self {
        Self {
            addr: Self::default_addr(),
            static_dirpath: Self::default_static_dirpath(),
        }
    }
}

impl FieldServerApi {
    pub(crate) fn default_addr() -> std::net::SocketAddr {
        "0.0.0.0:8025".parse().expect("valid address")
    }

    pub(crate) fn default_static_dirpath() -> std::path::PathBuf {
        "./web".into()
    }
}

impl Default for FieldStorage {
    fn default() -> Self {
        Self {
            filepath: Self::default_filepath(),
        }
    }
}

impl FieldStorage {
    pub(crate) fn default_filepath() -> std::path::PathBuf {
        "./emails.db".into()
    }
}
