/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use serde::{Deserialize, Serialize};

/// Search-level configuration, loaded from TOML. Much smaller than a
/// mutation-fuzzing config: there is no corpus, no mutation weights, no VM
/// supervision here, only the knobs the exhaustive explorer itself needs.
#[derive(Serialize, Deserialize, Clone)]
pub struct Config {
    pub explorer: ExplorerConfig,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ExplorerConfig {
    /// Disables the commutativity-based partial-order reduction, visiting
    /// every raw interleaving. Useful only to cross-check the reduction
    /// against a naive search; slower by design.
    pub disable_oracle: bool,
    /// Safety cap on search depth. `0` means unbounded.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            explorer: ExplorerConfig {
                disable_oracle: false,
                max_depth: 0,
            },
        }
    }
}
