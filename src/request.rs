/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A pending RPC plus the static commutativity oracle between two such RPCs.
//! Dispatch to the server goes through [`serve`], a single function over
//! this tagged enum — no function pointers are retained anywhere.

use crate::protocol::{FileAttr, FileHandle, Status};
use crate::server::{HandleOk, ReadOk, Server, WriteOk};

/// An immutable description of one outstanding RPC: procedure kind plus
/// bound arguments. Requests are served exactly once; the reply is then
/// immutable.
#[derive(Debug, Clone)]
pub enum Request {
    GetAttr {
        handle: FileHandle,
    },
    Lookup {
        dir: FileHandle,
        name: String,
    },
    Read {
        handle: FileHandle,
        offset: u64,
        count: u64,
    },
    Write {
        handle: FileHandle,
        offset: u64,
        data: Vec<u8>,
    },
    Create {
        dir: FileHandle,
        name: String,
    },
    Remove {
        dir: FileHandle,
        name: String,
    },
    Mkdir {
        dir: FileHandle,
        name: String,
    },
    Rmdir {
        dir: FileHandle,
        name: String,
    },
}

/// The server's reply to a served [`Request`], still tagged by procedure so
/// the client runtime can pattern-match the payload it expects.
#[derive(Debug, Clone)]
pub enum Reply {
    GetAttr(Status, Option<FileAttr>),
    Lookup(Status, Option<HandleOk>),
    Read(Status, Option<ReadOk>),
    Write(Status, Option<WriteOk>),
    Create(Status, Option<HandleOk>),
    Remove(Status),
    Mkdir(Status, Option<HandleOk>),
    Rmdir(Status),
}

impl Reply {
    pub fn status(&self) -> Status {
        match self {
            Reply::GetAttr(status, _)
            | Reply::Lookup(status, _)
            | Reply::Read(status, _)
            | Reply::Write(status, _)
            | Reply::Create(status, _)
            | Reply::Mkdir(status, _) => *status,
            Reply::Remove(status) | Reply::Rmdir(status) => *status,
        }
    }
}

/// Serves `request` against `server`, dispatching to the matching procedure.
/// The only function through which a [`Request`] is ever applied.
pub fn serve(server: &mut Server, request: &Request) -> Reply {
    match request {
        Request::GetAttr { handle } => {
            let (status, attr) = server.getattr(handle);
            Reply::GetAttr(status, attr)
        }
        Request::Lookup { dir, name } => {
            let (status, ok) = server.lookup(dir, name);
            Reply::Lookup(status, ok)
        }
        Request::Read {
            handle,
            offset,
            count,
        } => {
            let (status, ok) = server.read(handle, *offset, *count);
            Reply::Read(status, ok)
        }
        Request::Write {
            handle,
            offset,
            data,
        } => {
            let (status, ok) = server.write(handle, *offset, data);
            Reply::Write(status, ok)
        }
        Request::Create { dir, name } => {
            let (status, ok) = server.create(dir, name);
            Reply::Create(status, ok)
        }
        Request::Remove { dir, name } => Reply::Remove(server.remove(dir, name)),
        Request::Mkdir { dir, name } => {
            let (status, ok) = server.mkdir(dir, name);
            Reply::Mkdir(status, ok)
        }
        Request::Rmdir { dir, name } => Reply::Rmdir(server.rmdir(dir, name)),
    }
}

impl Request {
    pub fn is_file_op(&self) -> bool {
        matches!(
            self,
            Request::GetAttr { .. }
                | Request::Lookup { .. }
                | Request::Read { .. }
                | Request::Write { .. }
                | Request::Create { .. }
                | Request::Remove { .. }
        )
    }

    pub fn is_dir_op(&self) -> bool {
        matches!(self, Request::Mkdir { .. } | Request::Rmdir { .. })
    }

    /// True for the read-only group {GETATTR, LOOKUP, READ}, the only file
    /// ops allowed to commute against another same-path file op.
    fn is_read_only(&self) -> bool {
        matches!(
            self,
            Request::GetAttr { .. } | Request::Lookup { .. } | Request::Read { .. }
        )
    }

    /// The absolute path of the single node this request operates on: for
    /// LOOKUP/CREATE/REMOVE/MKDIR/RMDIR, the parent handle joined with the
    /// name argument; for GETATTR/READ/WRITE, the handle itself.
    pub fn path_of(&self) -> FileHandle {
        match self {
            Request::GetAttr { handle } | Request::Read { handle, .. } | Request::Write { handle, .. } => {
                handle.clone()
            }
            Request::Lookup { dir, name }
            | Request::Create { dir, name }
            | Request::Remove { dir, name }
            | Request::Mkdir { dir, name }
            | Request::Rmdir { dir, name } => dir.join(name),
        }
    }
}

/// True if `a` is a strict-or-equal prefix of `b`'s path components.
fn is_prefix(a: &FileHandle, b: &FileHandle) -> bool {
    let (a, b) = (a.components(), b.components());
    a.len() <= b.len() && a == &b[..a.len()]
}

/// The static commutativity oracle: a pure function of request kinds and
/// argument paths, independent of current server state. Reflexive and
/// symmetric; transitivity is neither required nor relied upon.
pub fn commutes(s: &Request, r: &Request) -> bool {
    match (s.is_file_op(), r.is_file_op()) {
        (true, true) => {
            let (ps, pr) = (s.path_of(), r.path_of());
            if ps != pr {
                true
            } else {
                s.is_read_only() && r.is_read_only()
            }
        }
        (true, false) => file_vs_dir_commutes(s, r),
        (false, true) => file_vs_dir_commutes(r, s),
        (false, false) => s.path_of() != r.path_of(),
    }
}

/// `file` is a file op, `dir` is a directory op (MKDIR/RMDIR). They commute
/// unless `dir`'s path is a prefix of (or equal to) `file`'s path — i.e. the
/// directory op touches something the file op is nested inside of.
fn file_vs_dir_commutes(file: &Request, dir: &Request) -> bool {
    !is_prefix(&dir.path_of(), &file.path_of())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(path: &str) -> FileHandle {
        let segments: Vec<String> = path.split('/').filter(|s| !s.is_empty()).map(str::to_owned).collect();
        FileHandle::from(segments)
    }

    #[test]
    fn different_file_paths_commute() {
        let a = Request::GetAttr { handle: h("/a.txt") };
        let b = Request::GetAttr { handle: h("/b.txt") };
        assert!(commutes(&a, &b));
        assert!(commutes(&b, &a));
    }

    #[test]
    fn same_path_read_only_pair_commutes() {
        let a = Request::GetAttr { handle: h("/a.txt") };
        let b = Request::Read { handle: h("/a.txt"), offset: 0, count: 1 };
        assert!(commutes(&a, &b));
    }

    #[test]
    fn same_path_write_does_not_commute_with_read() {
        let a = Request::Write { handle: h("/a.txt"), offset: 0, data: vec![1] };
        let b = Request::Read { handle: h("/a.txt"), offset: 0, count: 1 };
        assert!(!commutes(&a, &b));
        assert!(!commutes(&b, &a));
    }

    #[test]
    fn file_op_under_dir_does_not_commute_with_rmdir_of_dir() {
        let file = Request::Create { dir: h("/a/b"), name: "c.txt".to_owned() };
        let rmdir = Request::Rmdir { dir: h("/a"), name: "b".to_owned() };
        assert!(!commutes(&file, &rmdir));
        assert!(!commutes(&rmdir, &file));
    }

    #[test]
    fn file_op_outside_dir_commutes_with_rmdir() {
        let file = Request::Create { dir: h("/other"), name: "c.txt".to_owned() };
        let rmdir = Request::Rmdir { dir: h(""), name: "a".to_owned() };
        assert!(commutes(&file, &rmdir));
    }

    #[test]
    fn rmdir_same_dir_does_not_commute() {
        let a = Request::Rmdir { dir: h(""), name: "d".to_owned() };
        let b = Request::Mkdir { dir: h(""), name: "d".to_owned() };
        assert!(!commutes(&a, &b));
    }

    #[test]
    fn rmdir_different_dirs_commutes() {
        let a = Request::Rmdir { dir: h(""), name: "d1".to_owned() };
        let b = Request::Mkdir { dir: h(""), name: "d2".to_owned() };
        assert!(commutes(&a, &b));
    }
}
