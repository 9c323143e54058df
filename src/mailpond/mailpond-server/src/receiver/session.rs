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
use mailpond_common::{Envelop, ReplyCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Greeted,
    Ready,
    MailSet,
    RcptSet,
    DataCapture,
    Closed,
}

#[derive(Debug)]
enum Event {
    Hello,
    MailFrom(String),
    RcptTo(String),
    DataStart,
    DataLine(String),
    DataEnd,
    Reset,
    Noop,
    Quit,
    Unrecognized,
}

impl Event {
    /// One line of the command dialogue. Keywords are matched
    /// case-insensitively, unknown ones all map to [`Event::Unrecognized`].
    fn parse_cmd(line: &str) -> Self {
        let line = line.trim();

        if strip_command(line, "HELO").is_some() || strip_command(line, "EHLO").is_some() {
            return Self::Hello;
        }
        if let Some(rest) = strip_command(line, "MAIL FROM:") {
            return Self::MailFrom(capture_address(rest));
        }
        if let Some(rest) = strip_command(line, "RCPT TO:") {
            return Self::RcptTo(capture_address(rest));
        }

        if line.eq_ignore_ascii_case("DATA") {
            Self::DataStart
        } else if line.eq_ignore_ascii_case("QUIT") {
            Self::Quit
        } else if line.eq_ignore_ascii_case("RSET") {
            Self::Reset
        } else if line.eq_ignore_ascii_case("NOOP") {
            Self::Noop
        } else {
            Self::Unrecognized
        }
    }

    /// One line of a payload capture. Only a lone dot, untrimmed, ends
    /// the capture, so a line holding ` . ` stays payload.
    fn parse_data(line: &str) -> Self {
        if line == "." {
            Self::DataEnd
        } else {
            Self::DataLine(line.to_string())
        }
    }
}

fn strip_command<'a>(line: &'a str, command: &str) -> Option<&'a str> {
    match line.get(..command.len()) {
        Some(head) if head.eq_ignore_ascii_case(command) => Some(&line[command.len()..]),
        _ => None,
    }
}

fn capture_address(rest: &str) -> String {
    rest.trim_matches(|c: char| matches!(c, ' ' | ':' | '<' | '>'))
        .to_string()
}

/// What one received line amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResult {
    /// write this reply and keep going
    Reply(ReplyCode),
    /// write this reply, then close the connection
    ReplyThenClose(ReplyCode),
    /// the line was swallowed by a payload capture
    Nothing,
    /// a capture completed, the pipeline takes over
    Message(Envelop, String),
}

/// State machine of one submission dialogue.
///
/// Commands are never gated on one another: a `MAIL FROM` before any
/// `HELO`, or a `DATA` without envelope, are all accepted. Development
/// clients are sloppy and the sink is there to catch what they send.
pub struct Session {
    state: State,
    envelop: Envelop,
    payload: String,
    payload_size_max: usize,
}

impl Session {
    /// Start a dialogue, right after the greeting went out.
    #[must_use]
    pub fn new(payload_size_max: usize) -> Self {
        Self {
            state: State::Greeted,
            envelop: Envelop::default(),
            payload: String::new(),
            payload_size_max,
        }
    }

    /// Feed one received line, CRLF already stripped.
    pub fn receive_line(&mut self, line: &str) -> SessionResult {
        let event = if self.state == State::DataCapture {
            Event::parse_data
        } else {
            Event::parse_cmd
        }(line);

        self.process_event(event)
    }

    fn process_event(&mut self, event: Event) -> SessionResult {
        match (self.state, event) {
            (state, Event::Hello) => {
                if state == State::Greeted {
                    self.set_state(State::Ready);
                }
                SessionResult::Reply(ReplyCode::Helo)
            }
            (state, Event::MailFrom(from)) => {
                self.envelop.from = from;
                if matches!(state, State::Greeted | State::Ready) {
                    self.set_state(State::MailSet);
                }
                SessionResult::Reply(ReplyCode::Ok)
            }
            (_, Event::RcptTo(to)) => {
                // a second recipient overwrites the first, the record
                // keeps a single slot
                self.envelop.to = to;
                self.set_state(State::RcptSet);
                SessionResult::Reply(ReplyCode::Ok)
            }
            (_, Event::DataStart) => {
                self.set_state(State::DataCapture);
                SessionResult::Reply(ReplyCode::DataStart)
            }
            (State::DataCapture, Event::DataLine(line)) => {
                if self.payload.len() + line.len() + 2 > self.payload_size_max {
                    self.reset();
                    self.set_state(State::Closed);
                    return SessionResult::ReplyThenClose(ReplyCode::MessageSizeExceeded);
                }
                self.payload.push_str(&line);
                self.payload.push_str("\r\n");
                SessionResult::Nothing
            }
            (State::DataCapture, Event::DataEnd) => {
                let envelop = std::mem::take(&mut self.envelop);
                let payload = std::mem::take(&mut self.payload);
                self.set_state(State::Ready);
                SessionResult::Message(envelop, payload)
            }
            (_, Event::Reset) => {
                self.reset();
                self.set_state(State::Ready);
                SessionResult::Reply(ReplyCode::Ok)
            }
            (_, Event::Noop) => SessionResult::Reply(ReplyCode::Ok),
            (_, Event::Quit) => {
                self.set_state(State::Closed);
                SessionResult::ReplyThenClose(ReplyCode::Farewell)
            }
            (_, Event::Unrecognized) => SessionResult::Reply(ReplyCode::Unrecognized),
            // data events only come out of parse_data, never outside a capture
            _ => SessionResult::Reply(ReplyCode::Unrecognized),
        }
    }

    fn reset(&mut self) {
        self.envelop.clear();
        self.payload.clear();
    }

    fn set_state(&mut self, state: State) {
        log::trace!(
            target: log_channels::RECEIVER,
            "STATE: /{:?}/ => /{:?}/",
            self.state,
            state
        );
        self.state = state;
    }
}
