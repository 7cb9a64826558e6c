/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use serde::{Deserialize, Serialize};

/// Reply status for every server procedure, numbered as in the NFSv2 wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Status {
    Ok = 0,
    NoEnt = 2,
    Exist = 17,
    NotDir = 20,
    IsDir = 21,
    NotEmpty = 66,
    /// Reserved; never produced by this server (no cross-mount handle invalidation).
    Stale = 70,
}

impl Status {
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}
