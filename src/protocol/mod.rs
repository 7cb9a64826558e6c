/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Wire-level value types shared between client and server: status codes,
//! file handles, and file attributes.

mod attr;
mod handle;
mod status;

pub use attr::FileAttr;
pub use handle::FileHandle;
pub use status::Status;
