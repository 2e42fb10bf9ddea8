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

//! Terminal rendering of the status card.

use std::io::Write;

use chrono::Local;
use log::warn;
use server_status::format::UNKNOWN_PLACEHOLDER;
use server_status::{PollerStatus, RenderSink, Slot, StatusCard};

/// Render sink that prints one line per presented card.
#[derive(Debug)]
pub struct TerminalSink<W> {
    out: W,
    card: StatusCard,
    server_address: String,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, server_address: String) -> Self {
        Self {
            out,
            card: StatusCard::default(),
            server_address,
        }
    }
}

/// Format the card as a single line.
pub fn render_line(card: &StatusCard, server_address: &str) -> String {
    let or_unknown = |value: &str| {
        if value.is_empty() {
            UNKNOWN_PLACEHOLDER.to_string()
        } else {
            value.to_string()
        }
    };

    format!(
        "[{:<7}] {} · Jugadores: {} · Actualizado: {} · {}",
        card.state.as_str(),
        server_address,
        or_unknown(&card.players),
        or_unknown(&card.updated),
        card.note
    )
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn set_slot(&mut self, slot: Slot, value: &str) {
        self.card.set_slot(slot, value);
    }

    fn set_state(&mut self, state: PollerStatus) {
        self.card.set_state(state);
    }

    fn present(&mut self) {
        self.card.present();

        let line = render_line(&self.card, &self.server_address);
        let stamp = Local::now().format("%H:%M:%S");
        if let Err(e) = writeln!(self.out, "{stamp} {line}").and_then(|()| self.out.flush()) {
            warn!("Failed to write status card: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_line_placeholders() {
        let card = StatusCard {
            note: "Sincronizando…".to_string(),
            ..StatusCard::default()
        };
        assert_eq!(
            render_line(&card, "38.225.91.40:2702"),
            "[loading] 38.225.91.40:2702 · Jugadores: — · Actualizado: — · Sincronizando…"
        );
    }

    #[test]
    fn test_present_writes_a_line() {
        let mut sink = TerminalSink::new(Vec::new(), "play.example:2702".to_string());
        sink.set_slot(Slot::Players, "5/20");
        sink.set_slot(Slot::Updated, "01 ene, 00:00");
        sink.set_slot(Slot::Note, "Última sincronización · 01 ene, 00:00");
        sink.set_state(PollerStatus::Ready);
        sink.present();

        let output = String::from_utf8(sink.out.clone()).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("[ready  ] play.example:2702 · Jugadores: 5/20"));
        assert_eq!(sink.card.revision, 1);
    }
}
