/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Worked example scenarios, each a fresh-server factory plus a set of
//! fresh-program factories (the explorer needs to rebuild both from scratch
//! at every DFS node, so these are factories, not instances). These mirror
//! the concrete client "main" programs that are an opaque external contract
//! to the explorer; this module is one convenient set of them, not special
//! to the explorer itself.

use crate::client::program::ClientProgram;
use crate::client::script::ScriptBuilder;
use crate::protocol::FileHandle;
use crate::server::Server;

pub type ServerFactory = Box<dyn Fn() -> Server>;
pub type ProgramFactory = Box<dyn Fn() -> Box<dyn ClientProgram>>;

pub struct Scenario {
    pub name: &'static str,
    pub server: ServerFactory,
    pub programs: Vec<ProgramFactory>,
}

fn fresh_server() -> Server {
    Server::new()
}

/// A single client creates `/x` and writes to it. No concurrency, exactly
/// one reachable outcome.
pub fn single_writer() -> Scenario {
    Scenario {
        name: "single-writer",
        server: Box::new(fresh_server),
        programs: vec![Box::new(|| {
            Box::new(
                ScriptBuilder::new()
                    .create("/x")
                    .write(b"hello".to_vec())
                    .build(),
            ) as Box<dyn ClientProgram>
        })],
    }
}

/// Two clients race to append a single byte to `foo.txt`. The reachable
/// final contents are exactly {"1","2","12","21","11","22"}.
pub fn concurrent_appends() -> Scenario {
    Scenario {
        name: "concurrent-appends",
        server: Box::new(fresh_server),
        programs: vec![
            Box::new(|| {
                Box::new(
                    ScriptBuilder::new()
                        .open("/foo.txt")
                        .repeat_while_size_less_than(1, b"1".to_vec())
                        .build(),
                ) as Box<dyn ClientProgram>
            }),
            Box::new(|| {
                Box::new(
                    ScriptBuilder::new()
                        .open("/foo.txt")
                        .repeat_while_size_less_than(1, b"2".to_vec())
                        .build(),
                ) as Box<dyn ClientProgram>
            }),
        ],
    }
}

/// Same race with a third client, used to check the commutativity reduction
/// against the naive (oracle-disabled) interleaving count.
pub fn three_way_race() -> Scenario {
    Scenario {
        name: "three-way-race",
        server: Box::new(fresh_server),
        programs: vec![
            Box::new(|| {
                Box::new(
                    ScriptBuilder::new()
                        .open("/foo.txt")
                        .repeat_while_size_less_than(1, b"1".to_vec())
                        .build(),
                ) as Box<dyn ClientProgram>
            }),
            Box::new(|| {
                Box::new(
                    ScriptBuilder::new()
                        .open("/foo.txt")
                        .repeat_while_size_less_than(1, b"2".to_vec())
                        .build(),
                ) as Box<dyn ClientProgram>
            }),
            Box::new(|| {
                Box::new(
                    ScriptBuilder::new()
                        .open("/foo.txt")
                        .repeat_while_size_less_than(1, b"3".to_vec())
                        .build(),
                ) as Box<dyn ClientProgram>
            }),
        ],
    }
}

/// Two read-only clients against a pre-populated `foo.txt`; every schedule
/// collapses to a single equivalence class since GETATTR/LOOKUP/READ always
/// commute with each other on the same path.
pub fn read_only_clients() -> Scenario {
    Scenario {
        name: "read-only-clients",
        server: Box::new(|| {
            let mut server = Server::new();
            server.write(&FileHandle::root().join("foo.txt"), 0, b"hello");
            server
        }),
        programs: vec![
            Box::new(|| {
                Box::new(ScriptBuilder::new().open("/foo.txt").read(100).build())
                    as Box<dyn ClientProgram>
            }),
            Box::new(|| {
                Box::new(ScriptBuilder::new().open("/foo.txt").read(100).build())
                    as Box<dyn ClientProgram>
            }),
        ],
    }
}

/// Two clients work in disjoint subtrees; every pair of ops commutes so the
/// search collapses to a single Result regardless of interleaving.
pub fn cross_directory_independence() -> Scenario {
    Scenario {
        name: "cross-directory-independence",
        server: Box::new(fresh_server),
        programs: vec![
            Box::new(|| {
                Box::new(
                    ScriptBuilder::new()
                        .mkdir("/a")
                        .create("/a/x")
                        .write(b"a".to_vec())
                        .build(),
                ) as Box<dyn ClientProgram>
            }),
            Box::new(|| {
                Box::new(
                    ScriptBuilder::new()
                        .mkdir("/b")
                        .create("/b/y")
                        .write(b"b".to_vec())
                        .build(),
                ) as Box<dyn ClientProgram>
            }),
        ],
    }
}

/// Client A creates `/d` from nothing, client B removes it. The two orders
/// are not commutativity-equivalent: B before A fails with NOENT (nothing to
/// remove yet) while A's mkdir succeeds; A before B succeeds and B then
/// removes what A created. Exactly two Results are expected.
pub fn mkdir_rmdir_race() -> Scenario {
    Scenario {
        name: "mkdir-rmdir-race",
        server: Box::new(fresh_server),
        programs: vec![
            Box::new(|| Box::new(ScriptBuilder::new().mkdir("/d").build()) as Box<dyn ClientProgram>),
            Box::new(|| Box::new(ScriptBuilder::new().rmdir("/d").build()) as Box<dyn ClientProgram>),
        ],
    }
}

pub fn by_name(name: &str) -> Option<Scenario> {
    match name {
        "single-writer" => Some(single_writer()),
        "concurrent-appends" => Some(concurrent_appends()),
        "three-way-race" => Some(three_way_race()),
        "read-only-clients" => Some(read_only_clients()),
        "cross-directory-independence" => Some(cross_directory_independence()),
        "mkdir-rmdir-race" => Some(mkdir_rmdir_race()),
        _ => None,
    }
}

pub const SCENARIO_NAMES: &[&str] = &[
    "single-writer",
    "concurrent-appends",
    "three-way-race",
    "read-only-clients",
    "cross-directory-independence",
    "mkdir-rmdir-race",
];
