/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fs;

use anyhow::{Context, Ok};
use args::Args;
use clap::Parser;
use config::Config;
use log::{error, info};

mod args;
mod client;
mod config;
mod explorer;
mod protocol;
mod request;
mod server;

fn main() {
    let status = run();
    if let Err(ref err) = status {
        error!("{:?}", err);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    log4rs::init_file("log4rs.yml", Default::default()).with_context(|| "failed to init logger")?;
    info!("init logger");

    info!("read configuration");
    let config = fs::read_to_string(&args.config_path)
        .with_context(|| format!("failed to read configuration file '{}'", args.config_path))?;
    let config: Config =
        toml::from_str(&config).with_context(|| "failed to parse configuration")?;

    match args.mode {
        args::Mode::Demo { scenario } => {
            info!("explore scenario '{}'", scenario);
            let scenario = client::demo::by_name(&scenario)
                .with_context(|| format!("unknown scenario '{}'", scenario))?;
            let mut explorer = explorer::Explorer::new(scenario.server, scenario.programs);
            if config.explorer.disable_oracle {
                explorer = explorer.with_oracle_disabled();
            }
            if config.explorer.max_depth > 0 {
                explorer = explorer.with_depth_cap(config.explorer.max_depth);
            }
            explorer.run().with_context(|| "exploration failed")?;
            info!(
                "explored {} nodes, found {} distinct results",
                explorer.nodes_visited(),
                explorer.results().len()
            );
            println!("{}", explorer::summarize(explorer.results()));
        }
        args::Mode::ListScenarios => {
            for name in client::demo::SCENARIO_NAMES {
                println!("{}", name);
            }
        }
    }
    Ok(())
}
