// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Deserialize;
use serde::Serialize;
use slog::Logger;

mod config;
mod github;
mod onelogin;
mod response;
mod roster;
mod user;

pub use config::*;
pub use github::*;
pub use onelogin::*;
pub use response::*;
pub use roster::*;
pub use user::*;
