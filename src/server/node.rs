/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::BTreeMap;

/// A node in the server's file tree. Directories own their children; deleting
/// a directory drops every descendant with it.
#[derive(Debug, Clone)]
pub enum Node {
    Regular(Vec<u8>),
    Directory(BTreeMap<String, Node>),
}

impl Node {
    pub fn empty_regular() -> Self {
        Node::Regular(Vec::new())
    }

    pub fn empty_directory() -> Self {
        Node::Directory(BTreeMap::new())
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    pub fn as_directory(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Directory(children) => Some(children),
            Node::Regular(_) => None,
        }
    }

    pub fn as_directory_mut(&mut self) -> Option<&mut BTreeMap<String, Node>> {
        match self {
            Node::Directory(children) => Some(children),
            Node::Regular(_) => None,
        }
    }

    pub fn as_regular(&self) -> Option<&Vec<u8>> {
        match self {
            Node::Regular(bytes) => Some(bytes),
            Node::Directory(_) => None,
        }
    }

    pub fn as_regular_mut(&mut self) -> Option<&mut Vec<u8>> {
        match self {
            Node::Regular(bytes) => Some(bytes),
            Node::Directory(_) => None,
        }
    }
}
