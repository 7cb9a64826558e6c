/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use serde::{Deserialize, Serialize};

/// Attributes of a node, as returned by GETATTR/LOOKUP/CREATE/MKDIR. Only
/// meaningful for regular files; directories report a dummy zero size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttr {
    pub size: u64,
}

impl FileAttr {
    pub fn of_size(size: usize) -> Self {
        FileAttr { size: size as u64 }
    }

    pub fn dummy_dir() -> Self {
        FileAttr { size: 0 }
    }
}
