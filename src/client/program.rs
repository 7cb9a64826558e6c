/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The suspending-computation contract the explorer drives every client
//! process through. A native generator/coroutine is not available, so each
//! implementor is an explicit, restartable state machine.

use crate::request::{Reply, Request};

/// One step of a [`ClientProgram`]: either it has a [`Request`] ready to be
/// served, or it has run to completion.
pub enum ProgramStep {
    Yield(Request),
    Finished,
}

/// A restartable client process. `resume(None)` primes the computation to
/// its first suspension (or straight to `Finished` if the program issues no
/// RPCs); `resume(Some(reply))` delivers the server's reply to the most
/// recently yielded request and advances to the next suspension.
///
/// Implementors must terminate under every schedule: the explorer assumes
/// `resume` is eventually answered with `Finished`.
pub trait ClientProgram {
    fn resume(&mut self, reply: Option<Reply>) -> ProgramStep;
}
