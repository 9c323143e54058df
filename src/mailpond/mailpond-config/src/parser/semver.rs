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

pub(crate) fn serialize<S>(
    value: &semver::VersionReq,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<semver::VersionReq, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let requirement = <String as serde::Deserialize>::deserialize(deserializer)?;
    semver::VersionReq::parse(&requirement).map_err(serde::de::Error::custom)
}
