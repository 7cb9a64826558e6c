/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The in-memory NFSv2-like file server: tree of nodes plus the eight
//! procedures and the deterministic snapshot used as an equivalence key.

mod fs;
mod node;

pub use fs::{HandleOk, ReadOk, Server, WriteOk};
pub use node::Node;
