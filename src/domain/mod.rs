// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

mod report;
mod result_file;
mod timelog;

pub use report::*;
pub use result_file::*;
pub use timelog::*;
