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

//! Game server status card poller.
//!
//! This library keeps a small "server status card" up to date by periodically
//! fetching a remote status resource (BattleMetrics by default). It is split
//! into layers that can be used on their own:
//!
//! - **Protocol layer**: payload decoding into a [`ServerSnapshot`]
//! - **Format layer**: player counts, localized timestamps, addresses
//! - **Source layer**: cancellable HTTP fetch behind the [`StatusSource`] trait
//! - **Render layer**: the [`RenderSink`] trait and an in-memory [`StatusCard`]
//! - **Poller**: the sync cycle, refresh timer and visibility handling
//!
//! # Quick Start
//!
//! ```no_run
//! use server_status::{
//!     battlemetrics_endpoint, HttpStatusSource, Poller, PollerConfig, SharedStatusCard, Visibility,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let endpoint = battlemetrics_endpoint("36230853");
//!     let config = PollerConfig::new(endpoint.clone(), Some(30.0))?;
//!     let card = SharedStatusCard::new();
//!
//!     let poller = Poller::spawn(config, HttpStatusSource::new(endpoint), card.clone());
//!
//!     // Pause while nobody is looking, resume with an immediate sync.
//!     poller.set_visibility(Visibility::Hidden);
//!     poller.set_visibility(Visibility::Visible);
//!
//!     let mut status = poller.subscribe();
//!     status.changed().await?;
//!     println!("{:?}", card.snapshot());
//!     Ok(())
//! }
//! ```
//!
//! # Protocol Layer Only
//!
//! ```
//! use server_status::ServerSnapshot;
//!
//! let payload = serde_json::json!({
//!     "data": { "attributes": { "players": 5, "maxPlayers": 20 } }
//! });
//! assert_eq!(ServerSnapshot::from_payload(&payload).players(), "5/20");
//! ```

pub mod format;
pub mod poller;
pub mod protocol;
pub mod render;
pub mod source;

pub use format::{TimestampFormatter, Zone};
pub use poller::{
    effective_refresh_minutes, ConfigError, Poller, PollerConfig, Visibility,
    DEFAULT_REFRESH_MINUTES, MIN_REFRESH_MINUTES,
};
pub use protocol::ServerSnapshot;
pub use render::{PollerStatus, RenderSink, SharedStatusCard, Slot, StatusCard};
pub use source::{battlemetrics_endpoint, FetchError, HttpStatusSource, StatusSource};
