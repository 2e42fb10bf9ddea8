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

//! Render sink for the status card.
//!
//! The card has three text slots plus a state attribute used for styling.

use std::fmt;
use std::sync::{Arc, RwLock};

/// Presentation state of the status card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollerStatus {
    /// A sync is in progress.
    #[default]
    Loading,
    /// Last sync succeeded.
    Ready,
    /// Last sync failed; a retry is scheduled.
    Error,
    /// The in-flight sync was cancelled.
    Paused,
}

impl PollerStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PollerStatus::Loading => "loading",
            PollerStatus::Ready => "ready",
            PollerStatus::Error => "error",
            PollerStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for PollerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Addressable text slots on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Players,
    Updated,
    Note,
}

/// Output surface for the poller.
///
/// The poller writes slots and state, then calls [`RenderSink::present`] once
/// per render pass.
pub trait RenderSink {
    fn set_slot(&mut self, slot: Slot, value: &str);

    fn set_state(&mut self, state: PollerStatus);

    /// Called after a batch of slot/state writes.
    fn present(&mut self) {}
}

/// Snapshot of everything the card displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCard {
    pub state: PollerStatus,
    pub players: String,
    pub updated: String,
    pub note: String,
    /// Number of render passes presented so far.
    pub revision: u64,
}

impl RenderSink for StatusCard {
    fn set_slot(&mut self, slot: Slot, value: &str) {
        let target = match slot {
            Slot::Players => &mut self.players,
            Slot::Updated => &mut self.updated,
            Slot::Note => &mut self.note,
        };
        value.clone_into(target);
    }

    fn set_state(&mut self, state: PollerStatus) {
        self.state = state;
    }

    fn present(&mut self) {
        self.revision += 1;
    }
}

/// Thread-safe card that can be read while the poller writes to it.
#[derive(Debug, Clone, Default)]
pub struct SharedStatusCard(Arc<RwLock<StatusCard>>);

impl SharedStatusCard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current card contents.
    #[must_use]
    pub fn snapshot(&self) -> StatusCard {
        self.0.read().map(|card| card.clone()).unwrap_or_default()
    }
}

impl RenderSink for SharedStatusCard {
    fn set_slot(&mut self, slot: Slot, value: &str) {
        if let Ok(mut card) = self.0.write() {
            card.set_slot(slot, value);
        }
    }

    fn set_state(&mut self, state: PollerStatus) {
        if let Ok(mut card) = self.0.write() {
            card.set_state(state);
        }
    }

    fn present(&mut self) {
        if let Ok(mut card) = self.0.write() {
            card.present();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(PollerStatus::Loading.to_string(), "loading");
        assert_eq!(PollerStatus::Paused.as_str(), "paused");
    }

    #[test]
    fn test_shared_card_is_shared() {
        let card = SharedStatusCard::new();
        let mut writer = card.clone();

        writer.set_slot(Slot::Players, "5/20");
        writer.set_state(PollerStatus::Ready);
        writer.present();

        let snapshot = card.snapshot();
        assert_eq!(snapshot.players, "5/20");
        assert_eq!(snapshot.state, PollerStatus::Ready);
        assert_eq!(snapshot.revision, 1);
    }
}
