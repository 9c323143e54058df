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

use mailpond_common::re::anyhow::{self, Context};

/// Root of the configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// semver requirement the file was written against, checked on load
    #[serde(
        serialize_with = "crate::parser::semver::serialize",
        deserialize_with = "crate::parser::semver::deserialize"
    )]
    pub version_requirement: semver::VersionReq,
    /// the whole listening side
    #[serde(default)]
    pub server: FieldServer,
    /// where captured messages end up
    #[serde(default)]
    pub storage: FieldStorage,
}

/// Parameters shared by the submission and the query endpoints.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldServer {
    /// name the sink greets clients with
    #[serde(default = "FieldServer::hostname")]
    pub domain: String,
    /// simultaneous client cap, `-1` meaning no cap at all
    #[serde(default = "FieldServer::default_client_count_max")]
    pub client_count_max: i64,
    /// log levels, keyed by target prefix with a `default` fallback
    #[serde(default)]
    pub logs: FieldServerLogs,
    /// the submission endpoint
    #[serde(default)]
    pub smtp: FieldServerSMTP,
    /// the query endpoint
    #[serde(default)]
    pub api: FieldServerApi,
}

/// Log levels, keyed by target prefix.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldServerLogs {
    /// per-target levels, the `default` key applying to everything else
    #[serde(default = "FieldServerLogs::default_level")]
    pub level: std::collections::BTreeMap<String, log::LevelFilter>,
}

/// The submission endpoint.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldServerSMTP {
    /// address the submission listener binds
    #[serde(default = "FieldServerSMTP::default_addr")]
    pub addr: std::net::SocketAddr,
    /// how long a client may stay silent before the sink hangs up
    #[serde(with = "humantime_serde")]
    #[serde(default = "FieldServerSMTP::default_timeout_client")]
    pub timeout_client: std::time::Duration,
    /// payload cap in bytes, crossing it ends the session with a 552
    #[serde(default = "FieldServerSMTP::default_message_size_max")]
    pub message_size_max: usize,
}

/// The query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldServerApi {
    /// address the query listener binds
    #[serde(default = "FieldServerApi::default_addr")]
    pub addr: std::net::SocketAddr,
    /// directory served for requests outside `/api`
    #[serde(default = "FieldServerApi::default_static_dirpath")]
    pub static_dirpath: std::path::PathBuf,
}

/// Where captured messages end up.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldStorage {
    /// path of the sqlite database, created on first run
    #[serde(default = "FieldStorage::default_filepath")]
    pub filepath: std::path::PathBuf,
}

#[derive(serde::Deserialize)]
struct VersionRequirement {
    #[serde(deserialize_with = "crate::parser::semver::deserialize")]
    version_requirement: semver::VersionReq,
}

impl Config {
    /// Build a configuration from its toml representation.
    ///
    /// # Errors
    ///
    /// * the input is not valid toml, or carries unknown fields.
    /// * the `version_requirement` field is missing or does not accept
    ///   the version of this binary.
    pub fn from_toml(input: &str) -> anyhow::Result<Self> {
        let requirement = toml::from_str::<VersionRequirement>(input)
            .context("the field 'version_requirement' is missing or invalid")?
            .version_requirement;

        let pkg_version = semver::Version::parse(env!("CARGO_PKG_VERSION"))
            .context("failed to parse the version of the binary")?;

        anyhow::ensure!(
            requirement.matches(&pkg_version),
            "version requirement not fulfilled: expected '{requirement}' but this binary is '{pkg_version}'"
        );

        toml::from_str::<Self>(input).map_err(anyhow::Error::new)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use pretty_assertions::assert_eq;

    #[test]
    fn minimal_file_falls_back_on_defaults() {
        let config = Config::from_toml("version_requirement = \">=0.1.0, <1.0.0\"").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn version_requirement_is_mandatory() {
        assert!(Config::from_toml("").is_err());
    }

    #[test]
    fn version_requirement_gates_the_load() {
        let error = Config::from_toml("version_requirement = \">=2.0.0\"")
            .unwrap_err()
            .to_string();
        assert!(error.contains("version requirement not fulfilled"), "{error}");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::from_toml(concat!(
            "version_requirement = \">=0.1.0\"\n",
            "not_a_field = true\n",
        ))
        .is_err());
    }

    #[test]
    fn full_file() {
        let config = Config::from_toml(concat!(
            "version_requirement = \">=0.1.0, <1.0.0\"\n",
            "[server]\n",
            "domain = \"testserver.com\"\n",
            "client_count_max = 16\n",
            "[server.logs]\n",
            "level = { default = \"info\", \"smtp::receiver\" = \"trace\" }\n",
            "[server.smtp]\n",
            "addr = \"127.0.0.1:10025\"\n",
            "timeout_client = \"2m\"\n",
            "message_size_max = 25000000\n",
            "[server.api]\n",
            "addr = \"127.0.0.1:10080\"\n",
            "static_dirpath = \"/var/lib/mailpond/web\"\n",
            "[storage]\n",
            "filepath = \"/var/lib/mailpond/emails.db\"\n",
        ))
        .unwrap();

        assert_eq!(config.server.domain, "testserver.com");
        assert_eq!(config.server.client_count_max, 16);
        assert_eq!(
            config.server.logs.level.get("smtp::receiver"),
            Some(&log::LevelFilter::Trace)
        );
        assert_eq!(
            config.server.smtp.addr,
            "127.0.0.1:10025".parse::<std::net::SocketAddr>().unwrap()
        );
        assert_eq!(
            config.server.smtp.timeout_client,
            std::time::Duration::from_secs(120)
        );
        assert_eq!(config.server.smtp.message_size_max, 25_000_000);
        assert_eq!(
            config.server.api.static_dirpath,
            std::path::PathBuf::from("/var/lib/mailpond/web")
        );
        assert_eq!(
            config.storage.filepath,
            std::path::PathBuf::from("/var/lib/mailpond/emails.db")
        );
    }

    #[test]
    fn serialized_form_loads_back() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        assert_eq!(Config::from_toml(&serialized).unwrap(), config);
    }
}
