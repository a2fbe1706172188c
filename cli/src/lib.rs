// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod deprovision;
mod invite;
mod provision;

pub use deprovision::*;
pub use invite::*;
pub use provision::*;
