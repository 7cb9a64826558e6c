/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The client side of the protocol: the file-system facade clients call
//! through ([`runtime::ClientRuntime`]), the suspending-computation contract
//! the explorer drives ([`program::ClientProgram`]), a small bytecode
//! interpreter for composing calls into processes ([`script`]), and the
//! worked example scenarios built from it ([`demo`]).

pub mod demo;
pub mod program;
pub mod runtime;
pub mod script;

pub use program::{ClientProgram, ProgramStep};
pub use runtime::ClientRuntime;
