// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `shader-program`.
//
// `shader-program` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `shader-program` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `shader-program`. If not, see <https://www.gnu.org/licenses/>.

//! The outcome of building a program.

use crate::error::{Error, Stage};

/// Everything that went wrong while building a program.
///
/// A program is only usable if [`is_linked`] returns `true`. The failures are kept in the
/// order they happened.
///
/// [`is_linked`]: BuildReport::is_linked
#[derive(Debug, Default, thiserror::Error)]
#[error("shader program build failed ({} failure(s), linked: {linked})", .failures.len())]
pub struct BuildReport {
    /// Whether the driver reported a successful link.
    linked: bool,

    /// The failures, in order.
    failures: Vec<Error>,
}

impl BuildReport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a failure and send it to the diagnostics sink.
    pub(crate) fn push(&mut self, failure: Error) {
        if let Some(stage) = failure.stage() {
            tracing::error!(stage = stage.tag(), "{failure}");
        }

        self.failures.push(failure);
    }

    pub(crate) fn set_linked(&mut self, linked: bool) {
        self.linked = linked;
    }

    /// Whether the program linked, and is therefore usable.
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Whether every step succeeded.
    pub fn is_clean(&self) -> bool {
        self.linked && self.failures.is_empty()
    }

    /// Every recorded failure.
    pub fn failures(&self) -> &[Error] {
        &self.failures
    }

    /// The first failure recorded for a stage.
    pub fn failure(&self, stage: Stage) -> Option<&Error> {
        self.failures.iter().find(|f| f.stage() == Some(stage))
    }
}

/// Cut a driver info log down to at most `limit` characters.
pub(crate) fn truncate_log(mut log: String, limit: usize) -> String {
    if let Some((idx, _)) = log.char_indices().nth(limit) {
        log.truncate(idx);
    }

    log
}
