/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use serde_json::{Map, Value};

use crate::protocol::{FileAttr, FileHandle, Status};

use super::node::Node;

/// Successful LOOKUP/CREATE/MKDIR payload: the handle of the (possibly new)
/// node plus its freshly computed attributes.
#[derive(Debug, Clone)]
pub struct HandleOk {
    pub handle: FileHandle,
    pub attr: FileAttr,
}

#[derive(Debug, Clone)]
pub struct ReadOk {
    pub attr: FileAttr,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct WriteOk {
    pub attr: FileAttr,
}

/// Stateless-per-exploration, in-memory hierarchical file store. Every
/// procedure below is atomic from the scheduler's point of view: nothing
/// inside it suspends.
#[derive(Debug, Clone)]
pub struct Server {
    root: Node,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    /// Initial state: two empty regular files at the root, matching the
    /// worked examples throughout the literature this checker models.
    pub fn new() -> Self {
        let mut root = Node::empty_directory();
        if let Some(children) = root.as_directory_mut() {
            children.insert("foo.txt".to_owned(), Node::empty_regular());
            children.insert("bar.txt".to_owned(), Node::empty_regular());
        }
        Server { root }
    }

    fn resolve(&self, handle: &FileHandle) -> Result<&Node, Status> {
        let mut node = &self.root;
        for component in handle.components() {
            match node {
                Node::Regular(_) => return Err(Status::NoEnt),
                Node::Directory(children) => {
                    node = children.get(component).ok_or(Status::NoEnt)?;
                }
            }
        }
        Ok(node)
    }

    fn resolve_mut(&mut self, handle: &FileHandle) -> Result<&mut Node, Status> {
        let mut node = &mut self.root;
        for component in handle.components() {
            match node {
                Node::Regular(_) => return Err(Status::NoEnt),
                Node::Directory(children) => {
                    node = children.get_mut(component).ok_or(Status::NoEnt)?;
                }
            }
        }
        Ok(node)
    }

    fn attr_of(node: &Node) -> FileAttr {
        match node {
            Node::Regular(bytes) => FileAttr::of_size(bytes.len()),
            Node::Directory(_) => FileAttr::dummy_dir(),
        }
    }

    pub fn getattr(&self, handle: &FileHandle) -> (Status, Option<FileAttr>) {
        match self.resolve(handle) {
            Ok(node) => (Status::Ok, Some(Self::attr_of(node))),
            Err(status) => (status, None),
        }
    }

    pub fn lookup(&self, dir: &FileHandle, name: &str) -> (Status, Option<HandleOk>) {
        let children = match self.resolve(dir) {
            Ok(Node::Directory(children)) => children,
            Ok(Node::Regular(_)) => return (Status::NotDir, None),
            Err(status) => return (status, None),
        };
        match children.get(name) {
            Some(child) => (
                Status::Ok,
                Some(HandleOk {
                    handle: dir.join(name),
                    attr: Self::attr_of(child),
                }),
            ),
            None => (Status::NoEnt, None),
        }
    }

    pub fn read(&self, handle: &FileHandle, offset: u64, count: u64) -> (Status, Option<ReadOk>) {
        let bytes = match self.resolve(handle) {
            Ok(Node::Regular(bytes)) => bytes,
            Ok(Node::Directory(_)) => return (Status::IsDir, None),
            Err(status) => return (status, None),
        };
        let offset = offset as usize;
        let end = (offset.saturating_add(count as usize)).min(bytes.len());
        let data = if offset >= bytes.len() {
            Vec::new()
        } else {
            bytes[offset..end].to_vec()
        };
        (
            Status::Ok,
            Some(ReadOk {
                attr: FileAttr::of_size(bytes.len()),
                data,
            }),
        )
    }

    pub fn write(
        &mut self,
        handle: &FileHandle,
        offset: u64,
        data: &[u8],
    ) -> (Status, Option<WriteOk>) {
        let bytes = match self.resolve_mut(handle) {
            Ok(Node::Regular(bytes)) => bytes,
            Ok(Node::Directory(_)) => return (Status::IsDir, None),
            Err(status) => return (status, None),
        };
        let offset = offset as usize;
        let end = offset + data.len();
        if bytes.len() < end {
            bytes.resize(end, 0u8);
        }
        bytes[offset..end].copy_from_slice(data);
        (
            Status::Ok,
            Some(WriteOk {
                attr: FileAttr::of_size(bytes.len()),
            }),
        )
    }

    pub fn create(&mut self, dir: &FileHandle, name: &str) -> (Status, Option<HandleOk>) {
        let children = match self.resolve_mut(dir) {
            Ok(Node::Directory(children)) => children,
            Ok(Node::Regular(_)) => return (Status::NotDir, None),
            Err(status) => return (status, None),
        };
        if children.contains_key(name) {
            return (Status::Exist, None);
        }
        children.insert(name.to_owned(), Node::empty_regular());
        (
            Status::Ok,
            Some(HandleOk {
                handle: dir.join(name),
                attr: FileAttr::of_size(0),
            }),
        )
    }

    pub fn remove(&mut self, dir: &FileHandle, name: &str) -> Status {
        let children = match self.resolve_mut(dir) {
            Ok(Node::Directory(children)) => children,
            Ok(Node::Regular(_)) => return Status::NotDir,
            Err(status) => return status,
        };
        match children.get(name) {
            Some(Node::Directory(_)) => Status::IsDir,
            Some(Node::Regular(_)) => {
                children.remove(name);
                Status::Ok
            }
            None => Status::NoEnt,
        }
    }

    pub fn mkdir(&mut self, dir: &FileHandle, name: &str) -> (Status, Option<HandleOk>) {
        let children = match self.resolve_mut(dir) {
            Ok(Node::Directory(children)) => children,
            Ok(Node::Regular(_)) => return (Status::NotDir, None),
            Err(status) => return (status, None),
        };
        if children.contains_key(name) {
            return (Status::Exist, None);
        }
        children.insert(name.to_owned(), Node::empty_directory());
        (
            Status::Ok,
            Some(HandleOk {
                handle: dir.join(name),
                attr: FileAttr::dummy_dir(),
            }),
        )
    }

    pub fn rmdir(&mut self, dir: &FileHandle, name: &str) -> Status {
        let children = match self.resolve_mut(dir) {
            Ok(Node::Directory(children)) => children,
            Ok(Node::Regular(_)) => return Status::NotDir,
            Err(status) => return status,
        };
        match children.get(name) {
            Some(Node::Directory(grandchildren)) => {
                if grandchildren.is_empty() {
                    children.remove(name);
                    Status::Ok
                } else {
                    Status::NotEmpty
                }
            }
            Some(Node::Regular(_)) => Status::NotDir,
            None => Status::NoEnt,
        }
    }

    /// Deterministic serialization of the whole tree, used as the equivalence
    /// key between explored schedules. Directory keys are sorted (the
    /// `BTreeMap` backing already guarantees this); regular files serialize
    /// as their raw byte content, including any embedded NULs, via a lossy
    /// string view (bytes in this model are always single-byte ASCII writes).
    pub fn snapshot(&self) -> String {
        serde_json::to_string(&Self::to_value(&self.root)).expect("snapshot values are never NaN")
    }

    fn to_value(node: &Node) -> Value {
        match node {
            Node::Regular(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
            Node::Directory(children) => {
                let mut map = Map::new();
                for (name, child) in children {
                    map.insert(name.clone(), Self::to_value(child));
                }
                Value::Object(map)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn getattr_on_initial_files() {
        let server = Server::new();
        let handle = FileHandle::root().join("foo.txt");
        let (status, attr) = server.getattr(&handle);
        assert_eq!(status, Status::Ok);
        assert_eq!(attr.unwrap().size, 0);
    }

    #[test]
    fn lookup_missing_returns_noent() {
        let server = Server::new();
        let (status, ok) = server.lookup(&FileHandle::root(), "missing.txt");
        assert_eq!(status, Status::NoEnt);
        assert!(ok.is_none());
    }

    #[test]
    fn write_extends_with_nul_padding() {
        let mut server = Server::new();
        let handle = FileHandle::root().join("foo.txt");
        server.write(&handle, 0, b"a");
        server.write(&handle, 2, b"b");
        let (status, read) = server.read(&handle, 0, 10);
        assert_eq!(status, Status::Ok);
        assert_eq!(read.unwrap().data, b"a\0b".to_vec());
    }

    #[test]
    fn remove_on_directory_is_isdir() {
        let mut server = Server::new();
        server.mkdir(&FileHandle::root(), "d");
        assert_eq!(server.remove(&FileHandle::root(), "d"), Status::IsDir);
    }

    #[test]
    fn rmdir_nonempty_is_notempty() {
        let mut server = Server::new();
        server.mkdir(&FileHandle::root(), "d");
        server.create(&FileHandle::root().join("d"), "x");
        assert_eq!(server.rmdir(&FileHandle::root(), "d"), Status::NotEmpty);
    }

    #[test]
    fn mkdir_then_rmdir_restores_snapshot() {
        let mut server = Server::new();
        let before = server.snapshot();
        server.mkdir(&FileHandle::root(), "d");
        server.rmdir(&FileHandle::root(), "d");
        assert_eq!(server.snapshot(), before);
    }

    #[test]
    fn create_existing_name_is_exist() {
        let mut server = Server::new();
        let (status, _) = server.create(&FileHandle::root(), "foo.txt");
        assert_eq!(status, Status::Exist);
    }

    #[test]
    fn snapshot_sorts_keys() {
        let mut server = Server::new();
        server.create(&FileHandle::root(), "zzz.txt");
        server.create(&FileHandle::root(), "aaa.txt");
        let snapshot = server.snapshot();
        assert!(snapshot.find("aaa.txt").unwrap() < snapshot.find("zzz.txt").unwrap());
    }
}
