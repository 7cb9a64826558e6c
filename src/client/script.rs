/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A small bytecode interpreter generalizing "a client program" so worked
//! scenarios can be expressed as data instead of one hand-rolled state
//! machine per scenario. This is one concrete [`ClientProgram`] implementor,
//! not a replacement for the contract: anything satisfying `ClientProgram`
//! works with the explorer just as well.
//!
//! Grounded in the same idea as a recorded, replayable operation list (see
//! `server::fs` and the file this crate's abstract model descends from):
//! a flat instruction list is simpler to replay deterministically than a
//! retained closure or native coroutine, which this language has neither of
//! in stable, restartable form.

use crate::client::program::{ClientProgram, ProgramStep};
use crate::client::runtime::ClientRuntime;
use crate::request::{Reply, Request};

/// One bytecode instruction. Every variant that reaches the server
/// corresponds to exactly one suspension point; `Jump`/`BranchIfSizeGe` are
/// pure control flow and never suspend.
#[derive(Debug, Clone)]
pub enum Instr {
    Open(String),
    Close,
    Read(u64),
    Write(Vec<u8>),
    /// Issues a fresh GETATTR and stores the result in the size register.
    /// Never served from a cache (see [`ClientRuntime::size_complete`]).
    /// Used standalone by loop conditions; `append` has its own pair below
    /// rather than reusing this one, since the two are independent
    /// suspension points even when a loop's body is itself an `append`.
    Size,
    /// First half of `append`: a fresh GETATTR whose result becomes the
    /// target offset for the matching `AppendWrite`.
    AppendSize,
    /// Second half of `append`: write at the offset probed by the
    /// immediately preceding `AppendSize`.
    AppendWrite(Vec<u8>),
    Create(String),
    Remove,
    Mkdir(String),
    Rmdir(String),
    BranchIfSizeGe(i64, usize),
    /// Skips the next instruction (`append`'s write) when the size register
    /// holds the sentinel -1, i.e. the preceding `AppendSize` probe failed.
    BranchIfSizeNegative(usize),
    Jump(usize),
}

/// Builds a flat [`Instr`] program from a small fluent API. Holds a single
/// current-fd slot, which is enough to express every worked scenario in this
/// crate: no demo program needs two descriptors live at once.
#[derive(Default)]
pub struct ScriptBuilder {
    instrs: Vec<Instr>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        ScriptBuilder { instrs: Vec::new() }
    }

    pub fn open(mut self, path: impl Into<String>) -> Self {
        self.instrs.push(Instr::Open(path.into()));
        self
    }

    pub fn close(mut self) -> Self {
        self.instrs.push(Instr::Close);
        self
    }

    pub fn read(mut self, count: u64) -> Self {
        self.instrs.push(Instr::Read(count));
        self
    }

    pub fn write(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.instrs.push(Instr::Write(data.into()));
        self
    }

    pub fn create(mut self, path: impl Into<String>) -> Self {
        self.instrs.push(Instr::Create(path.into()));
        self
    }

    pub fn remove(mut self) -> Self {
        self.instrs.push(Instr::Remove);
        self
    }

    pub fn mkdir(mut self, path: impl Into<String>) -> Self {
        self.instrs.push(Instr::Mkdir(path.into()));
        self
    }

    pub fn rmdir(mut self, path: impl Into<String>) -> Self {
        self.instrs.push(Instr::Rmdir(path.into()));
        self
    }

    /// `append(fd, s)`: a fresh `size(fd)` to learn the current length,
    /// then a write of `s` at that offset. Two independent suspension
    /// points, standalone and usable outside any loop. If the size probe
    /// fails, the write is skipped entirely, matching `append`'s contract
    /// of returning false without writing when `size` errors.
    pub fn append(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.instrs.push(Instr::AppendSize);
        let branch_idx = self.instrs.len();
        self.instrs.push(Instr::BranchIfSizeNegative(usize::MAX));
        self.instrs.push(Instr::AppendWrite(data.into()));
        let after = self.instrs.len();
        self.instrs[branch_idx] = Instr::BranchIfSizeNegative(after);
        self
    }

    /// `while size(fd) < threshold: append(fd, data)`, the idiom every
    /// concurrent-append worked example in this domain is built from.
    /// The loop condition's GETATTR and `append`'s own GETATTR are two
    /// independent probes per iteration — both genuine suspension points
    /// another process can interleave between.
    pub fn repeat_while_size_less_than(mut self, threshold: i64, data: impl Into<Vec<u8>>) -> Self {
        let loop_start = self.instrs.len();
        self.instrs.push(Instr::Size);
        let branch_idx = self.instrs.len();
        self.instrs.push(Instr::BranchIfSizeGe(threshold, usize::MAX));
        self = self.append(data);
        self.instrs.push(Instr::Jump(loop_start));
        let after = self.instrs.len();
        self.instrs[branch_idx] = Instr::BranchIfSizeGe(threshold, after);
        self
    }

    pub fn build(self) -> ScriptProgram {
        ScriptProgram {
            instrs: self.instrs,
            pc: 0,
            fd: -1,
            size_reg: -1,
            runtime: ClientRuntime::new(),
        }
    }
}

/// An interpreted client process: program counter plus a single fd register
/// and a single size register, enough for every scenario in this crate.
pub struct ScriptProgram {
    instrs: Vec<Instr>,
    pc: usize,
    fd: i64,
    size_reg: i64,
    runtime: ClientRuntime,
}

impl ScriptProgram {
    fn complete(&mut self, reply: Reply) {
        match &self.instrs[self.pc] {
            Instr::Open(path) => self.fd = self.runtime.open_complete(path, reply),
            Instr::Close => unreachable!("Close never yields, so never completes"),
            Instr::Read(_) => {
                self.runtime.read_complete(self.fd, reply);
            }
            Instr::Write(data) => {
                self.runtime.write_complete(self.fd, data.len(), reply);
            }
            Instr::Size => self.size_reg = self.runtime.size_complete(reply),
            Instr::AppendSize => {
                self.size_reg = self
                    .runtime
                    .append_size_complete(reply)
                    .map(|offset| offset as i64)
                    .unwrap_or(-1)
            }
            Instr::AppendWrite(data) => {
                if self.size_reg >= 0 {
                    self.runtime.append_write_complete(
                        self.fd,
                        self.size_reg as u64,
                        data.len(),
                        reply,
                    );
                }
            }
            Instr::Create(path) => self.fd = self.runtime.create_complete(path, reply),
            Instr::Remove => {
                self.runtime.remove_complete(self.fd, reply);
            }
            Instr::Mkdir(_) => {
                ClientRuntime::mkdir_complete(reply);
            }
            Instr::Rmdir(_) => {
                ClientRuntime::rmdir_complete(reply);
            }
            Instr::BranchIfSizeGe(..) | Instr::BranchIfSizeNegative(_) | Instr::Jump(_) => {
                unreachable!("control-flow instructions never yield")
            }
        }
        self.pc += 1;
    }

    fn request_for_current(&self) -> Request {
        match &self.instrs[self.pc] {
            Instr::Open(path) => ClientRuntime::open_request(path),
            Instr::Read(count) => self
                .runtime
                .read_request(self.fd, *count)
                .expect("fd must be open before Read"),
            Instr::Write(data) => self
                .runtime
                .write_request(self.fd, data)
                .expect("fd must be open before Write"),
            Instr::Size => self
                .runtime
                .size_request(self.fd)
                .expect("fd must be open before Size"),
            Instr::AppendSize => self
                .runtime
                .append_size_request(self.fd)
                .expect("fd must be open before AppendSize"),
            Instr::AppendWrite(data) => self
                .runtime
                .append_write_request(self.fd, self.size_reg as u64, data)
                .expect("fd must be open before append's write"),
            Instr::Create(path) => ClientRuntime::create_request(path),
            Instr::Remove => self
                .runtime
                .remove_request(self.fd)
                .expect("fd must be open before Remove"),
            Instr::Mkdir(path) => ClientRuntime::mkdir_request(path),
            Instr::Rmdir(path) => ClientRuntime::rmdir_request(path),
            Instr::Close | Instr::BranchIfSizeGe(..) | Instr::BranchIfSizeNegative(_) | Instr::Jump(_) => {
                unreachable!("non-suspending instructions are handled before reaching here")
            }
        }
    }
}

impl ClientProgram for ScriptProgram {
    fn resume(&mut self, reply: Option<Reply>) -> ProgramStep {
        if let Some(reply) = reply {
            self.complete(reply);
        }
        loop {
            let Some(instr) = self.instrs.get(self.pc) else {
                return ProgramStep::Finished;
            };
            match instr {
                Instr::Jump(target) => {
                    self.pc = *target;
                }
                Instr::BranchIfSizeGe(threshold, target) => {
                    if self.size_reg >= *threshold {
                        self.pc = *target;
                    } else {
                        self.pc += 1;
                    }
                }
                Instr::BranchIfSizeNegative(target) => {
                    if self.size_reg < 0 {
                        self.pc = *target;
                    } else {
                        self.pc += 1;
                    }
                }
                Instr::Close => {
                    self.runtime.close(self.fd);
                    self.pc += 1;
                }
                _ => return ProgramStep::Yield(self.request_for_current()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FileHandle;
    use crate::request::serve;
    use crate::server::Server;

    fn drive(mut program: ScriptProgram, server: &mut Server) -> ScriptProgram {
        let mut reply = None;
        loop {
            match program.resume(reply.take()) {
                ProgramStep::Finished => return program,
                ProgramStep::Yield(request) => {
                    reply = Some(serve(server, &request));
                }
            }
        }
    }

    #[test]
    fn create_and_write_completes() {
        let mut server = Server::new();
        let program = ScriptBuilder::new().create("/x").write(b"hello".to_vec()).build();
        drive(program, &mut server);
        let (_, attr) = server.getattr(&FileHandle::root().join("x"));
        assert_eq!(attr.unwrap().size, 5);
    }

    #[test]
    fn standalone_append_writes_once_at_current_size() {
        let mut server = Server::new();
        let program = ScriptBuilder::new()
            .create("/foo.txt")
            .append(b"ab".to_vec())
            .append(b"c".to_vec())
            .build();
        drive(program, &mut server);
        let (_, attr) = server.getattr(&FileHandle::root().join("foo.txt"));
        assert_eq!(attr.unwrap().size, 3);
    }

    #[test]
    fn append_loop_reaches_threshold() {
        let mut server = Server::new();
        let program = ScriptBuilder::new()
            .open("/foo.txt")
            .repeat_while_size_less_than(1, b"1".to_vec())
            .build();
        drive(program, &mut server);
        let (_, attr) = server.getattr(&FileHandle::root().join("foo.txt"));
        assert!(attr.unwrap().size >= 1);
    }
}
