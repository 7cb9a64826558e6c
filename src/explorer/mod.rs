/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The interleaving explorer: a depth-first search over schedules that
//! replays its entire history from scratch at every node, memoizing
//! equivalent prefixes via the commutativity-based canonical key.

mod canonical;
mod result;

pub use canonical::canonical_key;
pub use result::ExploredResult;

use std::collections::HashSet;
use std::fmt::Write as _;

use log::debug;
use thiserror::Error;

use crate::client::demo::{ProgramFactory, ServerFactory};
use crate::client::program::ProgramStep;
use crate::request::{serve, Reply, Request};
use crate::server::Server;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("at least one client program is required")]
    EmptyProgramList,
    #[error("search depth exceeded configured cap of {0}")]
    DepthCapExceeded(usize),
}

/// Drives the DFS described in the design. Owns the factories needed to
/// rebuild a fresh server and fresh client processes at every node (replay-
/// from-scratch, not checkpoint/restore), plus the accumulated result set
/// and canonical-key memo table.
pub struct Explorer {
    server_factory: ServerFactory,
    program_factories: Vec<ProgramFactory>,
    history: Vec<usize>,
    results: HashSet<ExploredResult>,
    memo: HashSet<String>,
    /// When false, the canonical key degenerates to one distinct key per
    /// history (no partial-order collapsing) — used to cross-check that the
    /// reduction never drops or invents a Result, only redundant visits.
    use_oracle: bool,
    /// Optional safety cap on recursion depth; `None` means unbounded.
    depth_cap: Option<usize>,
    nodes_visited: usize,
}

impl Explorer {
    pub fn new(server_factory: ServerFactory, program_factories: Vec<ProgramFactory>) -> Self {
        Explorer {
            server_factory,
            program_factories,
            history: Vec::new(),
            results: HashSet::new(),
            memo: HashSet::new(),
            use_oracle: true,
            depth_cap: None,
            nodes_visited: 0,
        }
    }

    pub fn with_oracle_disabled(mut self) -> Self {
        self.use_oracle = false;
        self
    }

    pub fn with_depth_cap(mut self, cap: usize) -> Self {
        self.depth_cap = Some(cap);
        self
    }

    pub fn results(&self) -> &HashSet<ExploredResult> {
        &self.results
    }

    pub fn nodes_visited(&self) -> usize {
        self.nodes_visited
    }

    pub fn run(&mut self) -> Result<(), ExplorerError> {
        if self.program_factories.is_empty() {
            return Err(ExplorerError::EmptyProgramList);
        }
        self.history.clear();
        self.dfs()
    }

    fn dfs(&mut self) -> Result<(), ExplorerError> {
        self.nodes_visited += 1;
        if let Some(cap) = self.depth_cap {
            if self.history.len() > cap {
                return Err(ExplorerError::DepthCapExceeded(cap));
            }
        }

        let process_count = self.program_factories.len();
        let mut server = (self.server_factory)();
        let mut programs: Vec<_> = self.program_factories.iter().map(|f| f()).collect();
        let mut alive = vec![true; process_count];
        let mut pending: Vec<Option<Request>> = vec![None; process_count];
        let mut responses: Vec<Vec<Vec<u8>>> = vec![Vec::new(); process_count];
        let mut served_steps: Vec<(usize, Request)> = Vec::with_capacity(self.history.len());

        for pid in 0..process_count {
            match programs[pid].resume(None) {
                ProgramStep::Yield(request) => pending[pid] = Some(request),
                ProgramStep::Finished => alive[pid] = false,
            }
        }

        for &pid in &self.history {
            let request = pending[pid]
                .take()
                .expect("history only ever records a pid that was live with a pending request");
            let reply = serve(&mut server, &request);
            if let Reply::Read(status, Some(ok)) = &reply {
                if status.is_ok() {
                    responses[pid].push(ok.data.clone());
                }
            }
            served_steps.push((pid, request));
            match programs[pid].resume(Some(reply)) {
                ProgramStep::Yield(next) => pending[pid] = Some(next),
                ProgramStep::Finished => alive[pid] = false,
            }
        }

        let key = if self.use_oracle {
            canonical_key(&served_steps)
        } else {
            canonical::raw_key(&self.history)
        };
        if self.memo.contains(&key) {
            return Ok(());
        }

        if alive.iter().all(|&is_alive| !is_alive) {
            let result = ExploredResult {
                responses,
                snapshot: server.snapshot(),
            };
            debug!("recorded result at depth {}", self.history.len());
            self.results.insert(result);
            self.memo.insert(key);
            return Ok(());
        }

        for pid in 0..process_count {
            if alive[pid] {
                self.history.push(pid);
                self.dfs()?;
                self.history.pop();
            }
        }

        self.memo.insert(key);
        Ok(())
    }
}

/// Renders results in the format described in the external interface: one
/// divider-separated block per equivalence class, one line per process with
/// a non-empty response log, and the final server snapshot.
pub fn summarize(results: &HashSet<ExploredResult>) -> String {
    let mut out = String::new();
    for (index, result) in results.iter().enumerate() {
        let _ = writeln!(out, "----------------------------------------");
        let _ = writeln!(out, "Scenario #{}", index + 1);
        for (pid, responses) in result.responses.iter().enumerate() {
            if responses.is_empty() {
                continue;
            }
            let rendered: Vec<String> = responses
                .iter()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .collect();
            let _ = writeln!(out, "p{}: {:?}", pid, rendered);
        }
        let _ = writeln!(out, "File: {}", result.snapshot);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::demo;

    fn run_scenario(scenario: demo::Scenario) -> Explorer {
        let mut explorer = Explorer::new(scenario.server, scenario.programs);
        explorer.run().expect("scenario programs always terminate");
        explorer
    }

    #[test]
    fn single_writer_has_one_result() {
        let explorer = run_scenario(demo::single_writer());
        assert_eq!(explorer.results().len(), 1);
        let result = explorer.results().iter().next().unwrap();
        assert!(result.snapshot.contains("\"x\":\"hello\""));
    }

    #[test]
    fn concurrent_appends_produce_six_contents() {
        let explorer = run_scenario(demo::concurrent_appends());
        let mut contents: Vec<String> = explorer
            .results()
            .iter()
            .map(|result| {
                let value: serde_json::Value = serde_json::from_str(&result.snapshot).unwrap();
                value["foo.txt"].as_str().unwrap().to_owned()
            })
            .collect();
        contents.sort();
        contents.dedup();
        let mut expected = vec!["1", "2", "12", "21", "11", "22"]
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        expected.sort();
        assert_eq!(contents, expected);
    }

    #[test]
    fn read_only_clients_collapse_to_one_result() {
        let explorer = run_scenario(demo::read_only_clients());
        assert_eq!(explorer.results().len(), 1);
        let result = explorer.results().iter().next().unwrap();
        for responses in &result.responses {
            if !responses.is_empty() {
                assert_eq!(responses, &vec![b"hello".to_vec()]);
            }
        }
    }

    #[test]
    fn cross_directory_ops_collapse_to_one_result() {
        let explorer = run_scenario(demo::cross_directory_independence());
        assert_eq!(explorer.results().len(), 1);
    }

    #[test]
    fn mkdir_rmdir_race_has_two_results() {
        let explorer = run_scenario(demo::mkdir_rmdir_race());
        assert_eq!(explorer.results().len(), 2);
    }

    #[test]
    fn oracle_reduction_visits_fewer_nodes_but_same_results() {
        let scenario = demo::three_way_race();
        let mut reduced = Explorer::new(scenario.server, scenario.programs);
        reduced.run().unwrap();

        let scenario = demo::three_way_race();
        let mut naive = Explorer::new(scenario.server, scenario.programs).with_oracle_disabled();
        naive.run().unwrap();

        assert!(reduced.nodes_visited() < naive.nodes_visited());
        assert_eq!(reduced.results(), naive.results());
    }
}
