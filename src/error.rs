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

//! Errors and failure stages.

use crate::gpu_backend::{DriverError, ShaderStage};

use std::fmt;
use std::io;
use std::path::PathBuf;

/// An error that occurred while building or using a shader program.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source file could not be read.
    #[error("failed to read {stage} shader source from {}: {source}", .path.display())]
    SourceRead {
        /// The stage the file was meant for.
        stage: ShaderStage,

        /// The path that was read.
        path: PathBuf,

        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The driver rejected the source of a stage.
    #[error("{stage} shader failed to compile: {log}")]
    Compile {
        /// The stage that failed.
        stage: ShaderStage,

        /// The compiler's info log.
        log: String,
    },

    /// The driver could not link the stages together.
    #[error("shader program failed to link: {log}")]
    Link {
        /// The linker's info log.
        log: String,
    },

    /// A uniform name does not resolve to an active uniform.
    #[error("uniform `{name}` is not active in the program")]
    UniformNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// The driver could not allocate an object.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl Error {
    /// The build stage this error belongs to, if it is a build failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::SourceRead { .. } => Some(Stage::SourceRead),
            Error::Compile {
                stage: ShaderStage::Vertex,
                ..
            } => Some(Stage::VertexCompile),
            Error::Compile {
                stage: ShaderStage::Fragment,
                ..
            } => Some(Stage::FragmentCompile),
            Error::Link { .. } => Some(Stage::Link),
            Error::UniformNotFound { .. } | Error::Driver(_) => None,
        }
    }

    /// The driver's diagnostic text, for compile and link failures.
    pub fn info_log(&self) -> Option<&str> {
        match self {
            Error::Compile { log, .. } | Error::Link { log } => Some(log),
            _ => None,
        }
    }
}

/// A stage of building a program that can fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Reading a source file.
    SourceRead,

    /// Compiling the vertex shader.
    VertexCompile,

    /// Compiling the fragment shader.
    FragmentCompile,

    /// Linking the program.
    Link,
}

impl Stage {
    /// The tag attached to diagnostics for this stage.
    pub fn tag(self) -> &'static str {
        match self {
            Stage::SourceRead => "source_read",
            Stage::VertexCompile => "vertex_compile",
            Stage::FragmentCompile => "fragment_compile",
            Stage::Link => "link",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
