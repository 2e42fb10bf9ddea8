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

mod cli;
mod config;
mod control;
mod terminal;

use clap::Parser;
use log::{info, warn};
use server_status::{HttpStatusSource, Poller, PollerConfig, PollerStatus};

use cli::Args;
use config::AppConfig;
use terminal::TerminalSink;

const USER_AGENT: &str = concat!("status-card/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.print_config_path {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(());
    }

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Could not load configuration ({e}), using defaults");
        AppConfig::default()
    });
    config.apply_args(&args);

    if args.save_config {
        config.save()?;
        info!("Configuration saved to {}", AppConfig::get_config_path()?.display());
    }

    let endpoint = config.resolve_endpoint();
    let poller_config =
        PollerConfig::new(endpoint.clone(), config.refresh_minutes)?.with_formatter(config.formatter());

    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    let source = HttpStatusSource::with_client(client, endpoint);
    let sink = TerminalSink::new(std::io::stdout(), config.server_address.clone());

    let poller = Poller::spawn(poller_config, source, sink);

    if args.once {
        let mut status = poller.subscribe();
        let outcome = *status.wait_for(|s| *s != PollerStatus::Loading).await?;
        poller.shutdown();
        return match outcome {
            PollerStatus::Error => Err("server status sync failed".into()),
            _ => Ok(()),
        };
    }

    println!("{}", control::HELP);
    control::run(&poller).await;
    poller.shutdown();

    Ok(())
}
