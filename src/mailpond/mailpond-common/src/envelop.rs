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

/// Envelope addresses captured during the submission dialogue.
///
/// The sink keeps a single recipient slot. A second `RCPT TO` overwrites
/// the first, which is enough for a capture tool and keeps the record flat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelop {
    /// address captured from `MAIL FROM`, empty when none was sent
    pub from: String,
    /// address captured from `RCPT TO`, empty when none was sent
    pub to: String,
}

impl Envelop {
    /// Forget both addresses, as `RSET` or an end of payload requires.
    pub fn clear(&mut self) {
        self.from.clear();
        self.to.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::Envelop;

    #[test]
    fn default_is_empty() {
        let envelop = Envelop::default();
        assert_eq!(envelop.from, "");
        assert_eq!(envelop.to, "");
    }

    #[test]
    fn clear_resets_both_slots() {
        let mut envelop = Envelop {
            from: "john@doe.com".to_string(),
            to: "green@foo.net".to_string(),
        };
        envelop.clear();
        assert_eq!(envelop, Envelop::default());
    }
}
