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

//! The OpenGL backend, built on the [`glow`] crate.
//!
//! [`glow`]: https://crates.io/crates/glow

use crate::gpu_backend::{DriverError, ShaderContext, ShaderStage};
use crate::uniform::{UniformKind, UniformValue};

use glow::HasContext;

use std::cell::Cell;
use std::fmt;

/// Large enough to hold any uniform up to a `mat4`.
const READBACK_LEN: usize = 16;

/// A wrapper around a [`glow`] context.
///
/// [`glow`]: https://crates.io/crates/glow
pub struct GlowContext<H: HasContext + ?Sized> {
    /// The program most recently passed to `use_program` through this wrapper.
    current: Cell<Option<H::Program>>,

    /// The underlying context.
    context: H,
}

impl<H: HasContext + ?Sized> fmt::Debug for GlowContext<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowContext")
            .field("current", &self.current.get())
            .finish_non_exhaustive()
    }
}

impl<H: HasContext> GlowContext<H> {
    /// Wrap a [`glow`] context.
    ///
    /// # Safety
    ///
    /// The context must be current while calling new, and it must stay current on this thread
    /// whenever this wrapper or any program built from it is used or dropped.
    ///
    /// [`glow`]: https://crates.io/crates/glow
    pub unsafe fn new(context: H) -> Self {
        let version = context.version();
        tracing::debug!(
            "wrapping OpenGL{} {}.{} context",
            if version.is_embedded { " ES" } else { "" },
            version.major,
            version.minor
        );

        Self {
            current: Cell::new(None),
            context,
        }
    }

    /// Consume this wrapper and return the underlying context.
    pub fn into_inner(self) -> H {
        self.context
    }
}

impl<H: HasContext + ?Sized> GlowContext<H> {
    /// Get a reference to the underlying [`glow`] context.
    ///
    /// Programs made current through this reference are not seen by
    /// [`ShaderProgram::is_active`](crate::ShaderProgram::is_active).
    ///
    /// [`glow`]: https://crates.io/crates/glow
    pub fn context(&self) -> &H {
        &self.context
    }
}

impl<H: HasContext + ?Sized> ShaderContext for GlowContext<H> {
    type Shader = H::Shader;
    type Program = H::Program;
    type UniformLocation = H::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, DriverError> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };

        unsafe { self.context.create_shader(shader_type).gl_err() }
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) {
        unsafe {
            self.context.shader_source(shader, source);
            self.context.compile_shader(shader);
        }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.context.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.context.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe {
            self.context.delete_shader(shader);
        }
    }

    fn create_program(&self) -> Result<Self::Program, DriverError> {
        unsafe { self.context.create_program().gl_err() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe {
            self.context.attach_shader(program, shader);
        }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe {
            self.context.detach_shader(program, shader);
        }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe {
            self.context.link_program(program);
        }

        gl_error(&self.context);
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.context.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.context.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe {
            self.context.delete_program(program);
        }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe {
            self.context.use_program(program);
        }

        self.current.set(program);
    }

    fn current_program(&self) -> Option<Self::Program> {
        self.current.get()
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.context.get_uniform_location(program, name) }
    }

    fn write_uniform(&self, location: Option<&Self::UniformLocation>, value: &UniformValue) {
        unsafe {
            match value {
                UniformValue::Int(v) => match v.as_slice() {
                    &[x] => self.context.uniform_1_i32(location, x),
                    &[x, y] => self.context.uniform_2_i32(location, x, y),
                    &[x, y, z] => self.context.uniform_3_i32(location, x, y, z),
                    &[x, y, z, w] => self.context.uniform_4_i32(location, x, y, z, w),
                    _ => tracing::warn!("ignoring integer uniform with {} components", v.len()),
                },
                UniformValue::Float(v) => match v.as_slice() {
                    &[x] => self.context.uniform_1_f32(location, x),
                    &[x, y] => self.context.uniform_2_f32(location, x, y),
                    &[x, y, z] => self.context.uniform_3_f32(location, x, y, z),
                    &[x, y, z, w] => self.context.uniform_4_f32(location, x, y, z, w),
                    _ => tracing::warn!("ignoring float uniform with {} components", v.len()),
                },
            }
        }

        gl_error(&self.context);
    }

    fn read_uniform(
        &self,
        program: Self::Program,
        location: &Self::UniformLocation,
        kind: UniformKind,
        arity: usize,
    ) -> UniformValue {
        let arity = arity.clamp(1, crate::uniform::MAX_COMPONENTS);

        match kind {
            UniformKind::Int => {
                let mut buf = [0i32; READBACK_LEN];
                unsafe {
                    self.context.get_uniform_i32(program, location, &mut buf);
                }
                UniformValue::Int(buf[..arity].iter().copied().collect())
            }
            UniformKind::Float => {
                let mut buf = [0f32; READBACK_LEN];
                unsafe {
                    self.context.get_uniform_f32(program, location, &mut buf);
                }
                UniformValue::Float(buf[..arity].iter().copied().collect())
            }
        }
    }
}

fn gl_error(h: &(impl HasContext + ?Sized)) {
    let err = unsafe { h.get_error() };

    if err != glow::NO_ERROR {
        let error_str = match err {
            glow::INVALID_ENUM => "GL_INVALID_ENUM",
            glow::INVALID_VALUE => "GL_INVALID_VALUE",
            glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
            glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
            glow::CONTEXT_LOST => "GL_CONTEXT_LOST",
            _ => "Unknown GL error",
        };

        tracing::error!("GL error: {}", error_str)
    }
}

trait ResultExt<T> {
    fn gl_err(self) -> Result<T, DriverError>;
}

impl<T> ResultExt<T> for Result<T, String> {
    fn gl_err(self) -> Result<T, DriverError> {
        self.map_err(DriverError::from)
    }
}
