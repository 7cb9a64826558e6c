/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Canonical-form keys used to memoize equivalent schedules: histories that
//! differ only by swapping adjacent commuting requests collapse to the same
//! key, per the commutativity oracle in [`crate::request`].

use crate::request::{commutes, Request};

/// Groups adjacent pids whose served requests pairwise-commute with the
/// previous request in the block into sorted, comma-joined blocks separated
/// by `*`. Two histories with the same key are declared equivalent.
pub fn canonical_key(steps: &[(usize, Request)]) -> String {
    let mut blocks: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut prev: Option<&Request> = None;

    for (pid, request) in steps {
        let commutes_with_prev = prev.is_some_and(|p| commutes(p, request));
        if !commutes_with_prev && !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        current.push(*pid);
        prev = Some(request);
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    for block in &mut blocks {
        block.sort_unstable();
    }

    blocks
        .iter()
        .map(|block| {
            block
                .iter()
                .map(|pid| pid.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("*")
}

/// Raw, non-collapsing key used when the commutativity oracle is disabled
/// (e.g. for the naive-interleaving-count cross-check in scenario tests):
/// one key per distinct history, no two distinct histories ever collide.
pub fn raw_key(history: &[usize]) -> String {
    history
        .iter()
        .map(|pid| pid.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FileHandle;

    fn h(path: &str) -> FileHandle {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        FileHandle::from(segments)
    }

    #[test]
    fn adjacent_commuting_requests_share_a_key() {
        let a = Request::GetAttr { handle: h("/a.txt") };
        let b = Request::GetAttr { handle: h("/b.txt") };
        let key_ab = canonical_key(&[(0, a.clone()), (1, b.clone())]);
        let key_ba = canonical_key(&[(1, b), (0, a)]);
        assert_eq!(key_ab, key_ba);
    }

    #[test]
    fn non_commuting_requests_get_distinct_blocks() {
        let write = Request::Write {
            handle: h("/a.txt"),
            offset: 0,
            data: vec![1],
        };
        let read = Request::Read {
            handle: h("/a.txt"),
            offset: 0,
            count: 1,
        };
        let key = canonical_key(&[(0, write), (1, read)]);
        assert!(key.contains('*'));
    }
}
