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

//! Load a vertex and fragment shader from disk, link them into a program and set its
//! uniforms.
//!
//! The centerpiece of this crate is the [`ShaderProgram`] structure. It is built on top of
//! anything that implements [`ShaderContext`]; for OpenGL, wrap a [`glow`] context in a
//! [`GlowContext`].
//!
//! Building a program never fails because of bad shader code. Unreadable files, compile
//! errors and link errors are logged through [`tracing`] and collected into a
//! [`BuildReport`], and a program is returned either way. Check
//! [`ShaderProgram::is_linked`] or call [`ShaderProgram::into_result`] before drawing with
//! it.
//!
//! ```no_run
//! use shader_program::{GlowContext, ShaderProgram};
//! use std::rc::Rc;
//!
//! # fn load(gl: glow::Context) -> Result<(), Box<dyn std::error::Error>> {
//! // SAFETY: the context is current on this thread.
//! let context = Rc::new(unsafe { GlowContext::new(gl) });
//!
//! let program = ShaderProgram::from_files(context, "shaders/quad.vert", "shaders/quad.frag")?
//!     .into_result()?;
//!
//! program.use_program();
//! program.set_uniform("uTint", [1.0f32, 0.5, 0.25, 1.0]);
//! program.set_uniform("uFlipY", true);
//! # Ok(())
//! # }
//! ```
//!
//! Like the graphics APIs underneath it, this crate is single-threaded: programs share their
//! context through an [`Rc`] and must be used on the thread that owns it.
//!
//! [`glow`]: https://crates.io/crates/glow
//! [`tracing`]: https://crates.io/crates/tracing

#![warn(missing_docs, rust_2018_idioms)]

mod error;
mod glow_backend;
mod gpu_backend;
mod report;
mod source;
mod uniform;

pub use self::error::{Error, Stage};
pub use self::glow_backend::GlowContext;
pub use self::gpu_backend::{DriverError, ShaderContext, ShaderStage};
pub use self::report::BuildReport;
pub use self::uniform::{Uniform, UniformKind, UniformValue, MAX_COMPONENTS};

use std::fmt;
use std::mem;
use std::path::Path;
use std::rc::Rc;

/// The default number of characters kept from a driver info log.
pub const DEFAULT_INFO_LOG_LIMIT: usize = 512;

/// Options for building a [`ShaderProgram`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramOptions {
    info_log_limit: usize,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            info_log_limit: DEFAULT_INFO_LOG_LIMIT,
        }
    }
}

impl ProgramOptions {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of characters kept from a compile or link log.
    pub fn with_info_log_limit(mut self, limit: usize) -> Self {
        self.info_log_limit = limit;
        self
    }

    /// The maximum number of characters kept from a compile or link log.
    pub fn info_log_limit(&self) -> usize {
        self.info_log_limit
    }
}

/// A linked vertex and fragment shader.
///
/// The driver-side program object is deleted when this is dropped, so the context must still
/// be current at that point.
pub struct ShaderProgram<C: ShaderContext + ?Sized> {
    /// The driver handle for the program.
    program: C::Program,

    /// What went wrong while building it.
    report: BuildReport,

    /// The context the program lives in.
    context: Rc<C>,
}

impl<C: ShaderContext + ?Sized> fmt::Debug for ShaderProgram<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .field("linked", &self.report.is_linked())
            .finish_non_exhaustive()
    }
}

impl<C: ShaderContext + ?Sized> ShaderProgram<C> {
    /// Read, compile and link a program from two source files.
    ///
    /// A file that cannot be read is reported and replaced with empty source. The only
    /// errors returned are driver allocation failures; everything else ends up in
    /// [`report`](Self::report).
    pub fn from_files(
        context: Rc<C>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, Error> {
        Self::from_files_with(context, vertex_path, fragment_path, &ProgramOptions::default())
    }

    /// Read, compile and link a program from two source files with custom options.
    pub fn from_files_with(
        context: Rc<C>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
        options: &ProgramOptions,
    ) -> Result<Self, Error> {
        let mut report = BuildReport::new();
        let mut read = |stage, path: &Path| {
            source::read_source(stage, path).unwrap_or_else(|err| {
                report.push(err);
                String::new()
            })
        };

        let vertex = read(ShaderStage::Vertex, vertex_path.as_ref());
        let fragment = read(ShaderStage::Fragment, fragment_path.as_ref());

        Self::build(context, &vertex, &fragment, options, report)
    }

    /// Compile and link a program from in-memory sources.
    pub fn from_sources(context: Rc<C>, vertex: &str, fragment: &str) -> Result<Self, Error> {
        Self::from_sources_with(context, vertex, fragment, &ProgramOptions::default())
    }

    /// Compile and link a program from in-memory sources with custom options.
    pub fn from_sources_with(
        context: Rc<C>,
        vertex: &str,
        fragment: &str,
        options: &ProgramOptions,
    ) -> Result<Self, Error> {
        Self::build(context, vertex, fragment, options, BuildReport::new())
    }

    fn build(
        context: Rc<C>,
        vertex: &str,
        fragment: &str,
        options: &ProgramOptions,
        mut report: BuildReport,
    ) -> Result<Self, Error> {
        let program = {
            let vertex_shader =
                compile_stage(&*context, ShaderStage::Vertex, vertex, options, &mut report)?;
            let _delete_vertex = CallOnDrop(|| context.delete_shader(vertex_shader));

            let fragment_shader =
                compile_stage(&*context, ShaderStage::Fragment, fragment, options, &mut report)?;
            let _delete_fragment = CallOnDrop(|| context.delete_shader(fragment_shader));

            // Link even if a stage failed, so the linker gets to report its errors as well.
            let program = context.create_program()?;
            context.attach_shader(program, vertex_shader);
            context.attach_shader(program, fragment_shader);
            let _detach_shaders = CallOnDrop(|| {
                context.detach_shader(program, vertex_shader);
                context.detach_shader(program, fragment_shader);
            });
            context.link_program(program);

            let linked = context.program_link_status(program);
            if linked {
                tracing::debug!("linked shader program {program:?}");
            } else {
                let log = report::truncate_log(
                    context.program_info_log(program),
                    options.info_log_limit,
                );
                report.push(Error::Link { log });
            }
            report.set_linked(linked);

            program
        };

        Ok(ShaderProgram {
            program,
            report,
            context,
        })
    }

    /// Make this the program used by subsequent draw calls.
    pub fn use_program(&self) {
        tracing::trace!("using shader program {:?}", self.program);
        self.context.use_program(Some(self.program));
    }

    /// Whether the context reports this program as the one in use.
    pub fn is_active(&self) -> bool {
        self.context.current_program() == Some(self.program)
    }

    /// Write a value into a uniform.
    ///
    /// The value goes to the program that is currently in use, so call
    /// [`use_program`](Self::use_program) first. If `name` is not an active uniform of this
    /// program the write is silently dropped; use [`try_set_uniform`](Self::try_set_uniform)
    /// to find out.
    pub fn set_uniform<U: Uniform>(&self, name: &str, value: U) {
        let location = self.context.uniform_location(self.program, name);
        self.write(name, location.as_ref(), &value);
    }

    /// Write a value into a uniform, failing if it is not active in this program.
    pub fn try_set_uniform<U: Uniform>(&self, name: &str, value: U) -> Result<(), Error> {
        let location = self.context.uniform_location(self.program, name).ok_or_else(|| {
            Error::UniformNotFound {
                name: name.to_owned(),
            }
        })?;

        self.write(name, Some(&location), &value);
        Ok(())
    }

    fn write<U: Uniform>(&self, name: &str, location: Option<&C::UniformLocation>, value: &U) {
        tracing::trace!(
            "writing {:?}x{} uniform `{name}` of program {:?}",
            U::KIND,
            U::ARITY,
            self.program
        );
        self.context.write_uniform(location, &value.to_value());
    }

    /// Read the current value of a uniform back from the driver.
    ///
    /// Returns `None` if `name` is not an active uniform of this program.
    pub fn read_uniform<U: Uniform>(&self, name: &str) -> Option<U> {
        let location = self.context.uniform_location(self.program, name)?;
        let value = self
            .context
            .read_uniform(self.program, &location, U::KIND, U::ARITY);
        U::from_value(&value)
    }

    /// The raw driver handle.
    ///
    /// This is returned even if the program failed to link.
    pub fn id(&self) -> C::Program {
        self.program
    }

    /// Everything that went wrong while building this program.
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Whether the program linked, and is therefore usable.
    pub fn is_linked(&self) -> bool {
        self.report.is_linked()
    }

    /// Keep this program only if it linked.
    ///
    /// On failure the program object is deleted and the report is returned.
    pub fn into_result(mut self) -> Result<Self, BuildReport> {
        if self.report.is_linked() {
            Ok(self)
        } else {
            Err(mem::take(&mut self.report))
        }
    }

    /// The context this program lives in.
    pub fn context(&self) -> &Rc<C> {
        &self.context
    }
}

impl<C: ShaderContext + ?Sized> Drop for ShaderProgram<C> {
    fn drop(&mut self) {
        tracing::trace!("deleting shader program {:?}", self.program);
        self.context.delete_program(self.program);
    }
}

fn compile_stage<C: ShaderContext + ?Sized>(
    context: &C,
    stage: ShaderStage,
    source: &str,
    options: &ProgramOptions,
    report: &mut BuildReport,
) -> Result<C::Shader, Error> {
    let shader = context.create_shader(stage)?;
    context.compile_shader(shader, source);

    if !context.shader_compile_status(shader) {
        let log = report::truncate_log(context.shader_info_log(shader), options.info_log_limit);
        report.push(Error::Compile { stage, log });
    }

    Ok(shader)
}

struct CallOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}
