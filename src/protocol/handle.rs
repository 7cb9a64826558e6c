/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use serde::{Deserialize, Serialize};

/// A path from the server root, as an ordered sequence of component names.
/// An empty sequence denotes the root directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileHandle(Vec<String>);

impl FileHandle {
    pub fn root() -> Self {
        FileHandle(Vec::new())
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends a single component, returning a new handle. Handles are value
    /// types; this never mutates a handle another process still holds.
    pub fn join(&self, name: &str) -> FileHandle {
        let mut components = self.0.clone();
        components.push(name.to_owned());
        FileHandle(components)
    }

    /// Splits a `/`-rooted path string (e.g. `/a/b/c.txt`) into a parent
    /// handle and a final component name.
    pub fn split_path(path: &str) -> (FileHandle, String) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (name, parent) = segments
            .split_last()
            .map(|(last, rest)| (last.to_string(), rest.to_vec()))
            .unwrap_or_default();
        (
            FileHandle(parent.into_iter().map(str::to_owned).collect()),
            name,
        )
    }
}

impl From<Vec<String>> for FileHandle {
    fn from(components: Vec<String>) -> Self {
        FileHandle(components)
    }
}
