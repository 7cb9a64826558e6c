/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

/// One observed equivalence class: the per-process response log (only READ
/// payloads are recorded, per the observable-vector design note) and the
/// final server snapshot. Equality and hashing are structural over both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExploredResult {
    pub responses: Vec<Vec<Vec<u8>>>,
    pub snapshot: String,
}
