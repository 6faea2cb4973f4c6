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

//! Reading shader sources from disk.

use crate::error::Error;
use crate::gpu_backend::ShaderStage;

use std::fs;
use std::path::Path;

/// Read the whole source of one stage.
///
/// Bytes that are not valid UTF-8 become U+FFFD, so the compiler gets to report on them.
pub(crate) fn read_source(stage: ShaderStage, path: &Path) -> Result<String, Error> {
    let bytes = fs::read(path).map_err(|source| Error::SourceRead {
        stage,
        path: path.to_path_buf(),
        source,
    })?;

    tracing::trace!("read {} bytes of {stage} source from {}", bytes.len(), path.display());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
