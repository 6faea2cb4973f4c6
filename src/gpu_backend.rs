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

//! Defines the driver backend for shader programs.

use crate::uniform::{UniformKind, UniformValue};

use std::fmt;

/// The backend that compiles, links and feeds shader programs.
///
/// All of these calls are expected to happen on the thread that owns the graphics context,
/// while that context is current.
pub trait ShaderContext {
    /// A compiled (or failed) stage unit.
    ///
    /// This corresponds to [`NativeShader`] in [`glow`].
    ///
    /// [`NativeShader`]: https://docs.rs/glow/latest/glow/struct.NativeShader.html
    /// [`glow`]: https://crates.io/crates/glow
    type Shader: Copy + fmt::Debug;

    /// A linked (or failed) program object.
    type Program: Copy + PartialEq + fmt::Debug;

    /// The location of a uniform inside of a program.
    type UniformLocation: Clone + fmt::Debug;

    /// Create a new, empty stage unit.
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, DriverError>;

    /// Replace the source of a stage unit and compile it.
    fn compile_shader(&self, shader: Self::Shader, source: &str);

    /// Whether the last compilation of this stage unit succeeded.
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;

    /// Get the compiler's info log for a stage unit.
    fn shader_info_log(&self, shader: Self::Shader) -> String;

    /// Delete a stage unit.
    fn delete_shader(&self, shader: Self::Shader);

    /// Create a new, empty program object.
    fn create_program(&self) -> Result<Self::Program, DriverError>;

    /// Attach a stage unit to a program.
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Detach a stage unit from a program.
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Link a program.
    fn link_program(&self, program: Self::Program);

    /// Whether the last link of this program succeeded.
    fn program_link_status(&self, program: Self::Program) -> bool;

    /// Get the linker's info log for a program.
    fn program_info_log(&self, program: Self::Program) -> String;

    /// Delete a program.
    fn delete_program(&self, program: Self::Program);

    /// Make a program current, or unbind the current program with `None`.
    fn use_program(&self, program: Option<Self::Program>);

    /// The program that is currently in use, if any.
    fn current_program(&self) -> Option<Self::Program>;

    /// Look up the location of a uniform by name.
    ///
    /// Returns `None` if the uniform is not active in the program.
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    /// Write a value into a uniform of the current program.
    ///
    /// Writing to `None` is silently ignored.
    fn write_uniform(&self, location: Option<&Self::UniformLocation>, value: &UniformValue);

    /// Read the value of a uniform back from a program.
    ///
    /// `arity` is the number of components to read, between one and four.
    fn read_uniform(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        kind: UniformKind,
        arity: usize,
    ) -> UniformValue;
}

/// The stage of the pipeline that a shader source belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,

    /// The fragment stage.
    Fragment,
}

impl ShaderStage {
    /// Get a lowercase name for this stage.
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The driver failed to allocate an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError(String);

impl DriverError {
    /// Create a new driver error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        DriverError(message.into())
    }

    /// The driver's message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<String> for DriverError {
    fn from(s: String) -> Self {
        DriverError(s)
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver error: {}", self.0)
    }
}

impl std::error::Error for DriverError {}
