// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Interactive control of the poller from stdin.
//!
//! `hide` and `show` stand in for the visibility signal of the surface the
//! card is displayed on.

use log::{debug, error, info, warn};
use server_status::{Poller, Visibility};
use tokio::io::{AsyncBufReadExt, BufReader};

pub const HELP: &str = "Commands: hide (pause), show (resume + sync), sync, status, quit";

/// A command typed on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Hide,
    Show,
    Sync,
    Status,
    Help,
    Quit,
}

impl ControlCommand {
    /// Parse a command line, case-insensitive. Single-letter aliases work too.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "hide" | "h" | "pause" => Some(Self::Hide),
            "show" | "s" | "resume" => Some(Self::Show),
            "sync" | "r" | "refresh" => Some(Self::Sync),
            "status" | "?" => Some(Self::Status),
            "help" => Some(Self::Help),
            "quit" | "q" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

fn apply(poller: &Poller, command: ControlCommand) {
    match command {
        ControlCommand::Hide => poller.set_visibility(Visibility::Hidden),
        ControlCommand::Show => poller.set_visibility(Visibility::Visible),
        ControlCommand::Sync => poller.sync_now(),
        ControlCommand::Status => println!("Status: {}", poller.status()),
        ControlCommand::Help => println!("{HELP}"),
        ControlCommand::Quit => {}
    }
}

/// Read commands until `quit` or Ctrl-C.
///
/// When stdin closes the poller keeps running until Ctrl-C.
pub async fn run(poller: &Poller) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    error!("Failed to listen for Ctrl-C: {e}");
                }
                info!("Interrupted, shutting down");
                return;
            }

            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match ControlCommand::parse(&line) {
                    Some(ControlCommand::Quit) => return,
                    Some(command) => apply(poller, command),
                    None if line.trim().is_empty() => {}
                    None => warn!("Unknown command '{}'. {HELP}", line.trim()),
                },
                Ok(None) => {
                    debug!("stdin closed, waiting for Ctrl-C");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!("Failed to read stdin: {e}");
                    stdin_open = false;
                }
            },
        }
    }
}
