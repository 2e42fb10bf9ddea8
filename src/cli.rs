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

use clap::Parser;

/// Keep a game server status card in sync with BattleMetrics.
///
/// While running, type `hide`, `show`, `sync`, `status` or `quit` and press
/// Enter to control the poller.
#[derive(Debug, Parser)]
#[command(name = "status-card", version)]
pub struct Args {
    /// BattleMetrics server id
    #[arg(long)]
    pub server_id: Option<String>,

    /// Full status endpoint URL (overrides --server-id)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Refresh interval in minutes
    #[arg(long, allow_negative_numbers = true)]
    pub refresh_minutes: Option<f64>,

    /// Locale for timestamps, e.g. es_CL or en-US
    #[arg(long)]
    pub locale: Option<String>,

    /// Render timestamps at a fixed UTC offset instead of local time
    #[arg(long, allow_negative_numbers = true)]
    pub utc_offset_minutes: Option<i32>,

    /// Sync once, print the card and exit
    #[arg(long)]
    pub once: bool,

    /// Persist the effective settings to the config file
    #[arg(long)]
    pub save_config: bool,

    /// Print the config file path and exit
    #[arg(long)]
    pub print_config_path: bool,
}
