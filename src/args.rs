/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use clap::{builder::PossibleValuesParser, Parser, Subcommand};

use crate::client::demo::SCENARIO_NAMES;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file in TOML format
    #[arg(long, default_value_t = String::from("./config.toml"))]
    pub config_path: String,

    #[clap(subcommand)]
    pub mode: Mode,
}

#[derive(Debug, PartialEq, Clone, Subcommand)]
#[clap(rename_all = "kebab_case")]
pub enum Mode {
    /// Explore one of the built-in worked scenarios and print the summary
    Demo {
        /// Name of the scenario to explore
        #[arg(short, long)]
        #[clap(value_parser = PossibleValuesParser::new(SCENARIO_NAMES))]
        scenario: String,
    },
    /// List the names of the built-in worked scenarios
    ListScenarios,
}
