/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The client-side file-system facade: a finite descriptor pool plus one
//! request/complete method pair per operation. Every method that talks to
//! the server is split in two: a `*_request` that builds the [`Request`] to
//! yield, and a `*_complete` that consumes the matching [`Reply`] once the
//! scheduler feeds it back. Operations with no RPC of their own (`close`,
//! `seek`) run synchronously. `append` is the one operation with two
//! suspension points, so it gets two request/complete pairs instead of one.

use std::collections::{HashMap, VecDeque};

use crate::protocol::{FileAttr, FileHandle};
use crate::request::{Reply, Request};

pub const MAX_FILES: usize = 100;

#[derive(Debug, Clone)]
struct OpenFile {
    handle: FileHandle,
    offset: u64,
    path: String,
    /// Read-through cache of the last attributes seen for this descriptor,
    /// refreshed by read/write/append completions. Never consulted by
    /// `size()` itself (see [`ClientRuntime::size_complete`]); it exists so
    /// other future readers of a descriptor's attributes have a last-known
    /// value without forcing a GETATTR of their own.
    attr_cache: Option<FileAttr>,
}

/// Per-client state: which descriptors are free, and what each open one
/// points at. Deliberately holds no cache consulted by `size()` — every
/// `size()` call issues a fresh GETATTR (see [`ClientRuntime::size_complete`]).
#[derive(Debug, Clone)]
pub struct ClientRuntime {
    available_fds: VecDeque<i64>,
    open: HashMap<i64, OpenFile>,
}

impl Default for ClientRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientRuntime {
    pub fn new() -> Self {
        ClientRuntime {
            available_fds: (0..MAX_FILES as i64).collect(),
            open: HashMap::new(),
        }
    }

    fn alloc_fd(&mut self) -> Option<i64> {
        self.available_fds.pop_front()
    }

    fn release_fd(&mut self, fd: i64) {
        self.open.remove(&fd);
        self.available_fds.push_front(fd);
    }

    pub fn is_open(&self, fd: i64) -> bool {
        self.open.contains_key(&fd)
    }

    // --- open ---

    pub fn open_request(path: &str) -> Request {
        let (dir, name) = FileHandle::split_path(path);
        Request::Lookup { dir, name }
    }

    /// Returns the new fd, or -1 on lookup failure or pool exhaustion.
    pub fn open_complete(&mut self, path: &str, reply: Reply) -> i64 {
        let Reply::Lookup(status, ok) = reply else {
            panic!("open_complete fed a non-LOOKUP reply");
        };
        if !status.is_ok() {
            return -1;
        }
        let ok = ok.expect("OK lookup carries a payload");
        match self.alloc_fd() {
            Some(fd) => {
                self.open.insert(
                    fd,
                    OpenFile {
                        handle: ok.handle,
                        offset: 0,
                        path: path.to_owned(),
                        attr_cache: Some(ok.attr),
                    },
                );
                fd
            }
            None => -1,
        }
    }

    // --- close (no RPC) ---

    pub fn close(&mut self, fd: i64) -> bool {
        if self.is_open(fd) {
            self.release_fd(fd);
            true
        } else {
            false
        }
    }

    // --- read ---

    pub fn read_request(&self, fd: i64, count: u64) -> Option<Request> {
        let file = self.open.get(&fd)?;
        Some(Request::Read {
            handle: file.handle.clone(),
            offset: file.offset,
            count,
        })
    }

    pub fn read_complete(&mut self, fd: i64, reply: Reply) -> Vec<u8> {
        let Reply::Read(status, ok) = reply else {
            panic!("read_complete fed a non-READ reply");
        };
        if !status.is_ok() {
            return Vec::new();
        }
        let ok = ok.expect("OK read carries a payload");
        if let Some(file) = self.open.get_mut(&fd) {
            file.offset += ok.data.len() as u64;
            file.attr_cache = Some(ok.attr);
        }
        ok.data
    }

    // --- write ---

    pub fn write_request(&self, fd: i64, data: &[u8]) -> Option<Request> {
        let file = self.open.get(&fd)?;
        Some(Request::Write {
            handle: file.handle.clone(),
            offset: file.offset,
            data: data.to_vec(),
        })
    }

    pub fn write_complete(&mut self, fd: i64, len: usize, reply: Reply) -> bool {
        let Reply::Write(status, ok) = reply else {
            panic!("write_complete fed a non-WRITE reply");
        };
        if status.is_ok() {
            if let Some(file) = self.open.get_mut(&fd) {
                file.offset += len as u64;
                file.attr_cache = ok.map(|ok| ok.attr);
            }
            true
        } else {
            false
        }
    }

    /// Like [`Self::write_request`], but at an explicit offset rather than
    /// the descriptor's cached offset. Used by `append`, whose offset comes
    /// from a just-completed `size()` reply, not from the descriptor.
    pub fn write_at_request(&self, fd: i64, offset: u64, data: &[u8]) -> Option<Request> {
        let file = self.open.get(&fd)?;
        Some(Request::Write {
            handle: file.handle.clone(),
            offset,
            data: data.to_vec(),
        })
    }

    pub fn write_at_complete(&mut self, fd: i64, offset: u64, len: usize, reply: Reply) -> bool {
        let Reply::Write(status, ok) = reply else {
            panic!("write_at_complete fed a non-WRITE reply");
        };
        if status.is_ok() {
            if let Some(file) = self.open.get_mut(&fd) {
                file.offset = offset + len as u64;
                file.attr_cache = ok.map(|ok| ok.attr);
            }
            true
        } else {
            false
        }
    }

    // --- append ---
    //
    // `append(fd, s)` has two suspension points: `size(fd)` to learn the
    // current length, then a write of `s` at that offset. It is built
    // directly from the `size`/`write_at` primitives above rather than
    // duplicating their logic, matching how the runtime this models
    // delegates `append` to `size` and `write` in turn.

    pub fn append_size_request(&self, fd: i64) -> Option<Request> {
        self.size_request(fd)
    }

    /// Completes append's size probe, returning the offset its write should
    /// target, or `None` if the probe failed (append as a whole then fails).
    pub fn append_size_complete(&self, reply: Reply) -> Option<u64> {
        let size = self.size_complete(reply);
        if size < 0 {
            None
        } else {
            Some(size as u64)
        }
    }

    pub fn append_write_request(&self, fd: i64, offset: u64, data: &[u8]) -> Option<Request> {
        self.write_at_request(fd, offset, data)
    }

    pub fn append_write_complete(&mut self, fd: i64, offset: u64, len: usize, reply: Reply) -> bool {
        self.write_at_complete(fd, offset, len, reply)
    }

    // --- seek (no RPC) ---

    pub fn seek(&mut self, fd: i64, pos: u64) -> bool {
        match self.open.get_mut(&fd) {
            Some(file) => {
                file.offset = pos;
                true
            }
            None => false,
        }
    }

    // --- size ---

    pub fn size_request(&self, fd: i64) -> Option<Request> {
        let file = self.open.get(&fd)?;
        Some(Request::GetAttr {
            handle: file.handle.clone(),
        })
    }

    /// Always a fresh RPC; never answered from a cache, per the anti-stale
    /// policy carried over from the original runtime this models.
    pub fn size_complete(&self, reply: Reply) -> i64 {
        let Reply::GetAttr(status, attr) = reply else {
            panic!("size_complete fed a non-GETATTR reply");
        };
        if status.is_ok() {
            attr.expect("OK getattr carries a payload").size as i64
        } else {
            -1
        }
    }

    // --- create ---

    pub fn create_request(path: &str) -> Request {
        let (dir, name) = FileHandle::split_path(path);
        Request::Create { dir, name }
    }

    pub fn create_complete(&mut self, path: &str, reply: Reply) -> i64 {
        let Reply::Create(status, ok) = reply else {
            panic!("create_complete fed a non-CREATE reply");
        };
        if !status.is_ok() {
            return -1;
        }
        let ok = ok.expect("OK create carries a payload");
        match self.alloc_fd() {
            Some(fd) => {
                self.open.insert(
                    fd,
                    OpenFile {
                        handle: ok.handle,
                        offset: 0,
                        path: path.to_owned(),
                        attr_cache: Some(ok.attr),
                    },
                );
                fd
            }
            None => -1,
        }
    }

    // --- remove ---

    pub fn remove_request(&self, fd: i64) -> Option<Request> {
        let file = self.open.get(&fd)?;
        let (dir, name) = FileHandle::split_path(&file.path);
        Some(Request::Remove { dir, name })
    }

    pub fn remove_complete(&mut self, fd: i64, reply: Reply) -> bool {
        let Reply::Remove(status) = reply else {
            panic!("remove_complete fed a non-REMOVE reply");
        };
        if status.is_ok() {
            self.release_fd(fd);
            true
        } else {
            false
        }
    }

    // --- mkdir / rmdir ---

    pub fn mkdir_request(path: &str) -> Request {
        let (dir, name) = FileHandle::split_path(path);
        Request::Mkdir { dir, name }
    }

    pub fn mkdir_complete(reply: Reply) -> bool {
        let Reply::Mkdir(status, _) = reply else {
            panic!("mkdir_complete fed a non-MKDIR reply");
        };
        status.is_ok()
    }

    pub fn rmdir_request(path: &str) -> Request {
        let (dir, name) = FileHandle::split_path(path);
        Request::Rmdir { dir, name }
    }

    pub fn rmdir_complete(reply: Reply) -> bool {
        let Reply::Rmdir(status) = reply else {
            panic!("rmdir_complete fed a non-RMDIR reply");
        };
        status.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::Server;
    use crate::request::serve;

    #[test]
    fn open_read_round_trip() {
        let mut server = Server::new();
        server.write(&FileHandle::root().join("foo.txt"), 0, b"hello");
        let mut client = ClientRuntime::new();

        let req = ClientRuntime::open_request("/foo.txt");
        let reply = serve(&mut server, &req);
        let fd = client.open_complete("/foo.txt", reply);
        assert!(fd >= 0);

        let req = client.read_request(fd, 100).unwrap();
        let reply = serve(&mut server, &req);
        let data = client.read_complete(fd, reply);
        assert_eq!(data, b"hello".to_vec());
    }

    #[test]
    fn append_writes_at_current_size() {
        let mut server = Server::new();
        server.write(&FileHandle::root().join("foo.txt"), 0, b"ab");
        let mut client = ClientRuntime::new();

        let req = ClientRuntime::open_request("/foo.txt");
        let reply = serve(&mut server, &req);
        let fd = client.open_complete("/foo.txt", reply);

        let req = client.append_size_request(fd).unwrap();
        let reply = serve(&mut server, &req);
        let offset = client.append_size_complete(reply).unwrap();
        assert_eq!(offset, 2);

        let req = client.append_write_request(fd, offset, b"c").unwrap();
        let reply = serve(&mut server, &req);
        assert!(client.append_write_complete(fd, offset, 1, reply));

        let (_, attr) = server.getattr(&FileHandle::root().join("foo.txt"));
        assert_eq!(attr.unwrap().size, 3);
    }

    #[test]
    fn fd_pool_is_fifo_front_insert() {
        let mut client = ClientRuntime::new();
        assert_eq!(client.alloc_fd(), Some(0));
        assert_eq!(client.alloc_fd(), Some(1));
        client.open.insert(
            0,
            OpenFile {
                handle: FileHandle::root(),
                offset: 0,
                path: "/x".into(),
                attr_cache: None,
            },
        );
        client.release_fd(0);
        assert_eq!(client.alloc_fd(), Some(0));
    }
}
