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

//! Builds the test shaders on a real OpenGL driver, writes one uniform of every kind and
//! width, and reads each one back.
//!
//! Exits with a non-zero code if anything does not match.

#[path = "util/setup_context.rs"]
mod util;

use shader_program::{GlowContext, ShaderProgram, Stage, Uniform};

use std::error::Error;
use std::fmt::Debug;
use std::path::PathBuf;
use std::rc::Rc;

type Program = ShaderProgram<GlowContext<glow::Context>>;

fn shader_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/shaders")
        .join(name)
}

fn main() -> Result<(), Box<dyn Error>> {
    util::init();

    util::with_context(|gl| {
        // SAFETY: the context was just made current on this thread.
        let context = Rc::new(unsafe { GlowContext::new(gl) });

        let result = uniforms_round_trip(&context).and_then(|()| failures_are_reported(&context));
        match result {
            Ok(()) => {
                println!("every check passed");
                0
            }
            Err(err) => {
                eprintln!("check failed: {err}");
                1
            }
        }
    })
}

fn uniforms_round_trip(context: &Rc<GlowContext<glow::Context>>) -> Result<(), Box<dyn Error>> {
    let program = ShaderProgram::from_files(
        context.clone(),
        shader_path("basic.vert"),
        shader_path("basic.frag"),
    )?
    .into_result()?;

    program.use_program();
    if !program.is_active() {
        return Err("the program is not active after use_program".into());
    }

    round_trip(&program, "uEnabled", true)?;
    round_trip(&program, "uMask2", [true, false])?;
    round_trip(&program, "uMask3", [false, true, true])?;
    round_trip(&program, "uMask4", [true, false, false, true])?;

    round_trip(&program, "uMode", 3)?;
    round_trip(&program, "uCell", [16, 9])?;
    round_trip(&program, "uCell3", [-1, 0, 1])?;
    round_trip(&program, "uRect", [0, 0, 640, 480])?;

    round_trip(&program, "uTime", 2.5f32)?;
    round_trip(&program, "uScale", [2.0f32, 0.5])?;
    round_trip(&program, "uTint", [1.0f32, 0.5, 0.25])?;
    round_trip(&program, "uColor", [0.1f32, 0.2, 0.3, 1.0])?;
    round_trip(&program, "uOffset", [0.5f32, -0.5])?;

    // Bools are stored as integers by the driver.
    match program.read_uniform::<[i32; 4]>("uMask4") {
        Some([1, 0, 0, 1]) => {}
        other => return Err(format!("uMask4 read back as {other:?}").into()),
    }

    // Writing to names the driver does not know is a no-op, and the rest stays intact.
    program.set_uniform("uMissing", 1.0f32);
    program.set_uniform("uUnused", [1, 2]);
    if program.read_uniform::<i32>("uMode") != Some(3) {
        return Err("a write to an absent uniform disturbed uMode".into());
    }

    Ok(())
}

fn round_trip<U>(program: &Program, name: &str, value: U) -> Result<(), Box<dyn Error>>
where
    U: Uniform + Copy + PartialEq + Debug,
{
    program.try_set_uniform(name, value)?;

    match program.read_uniform::<U>(name) {
        Some(read) if read == value => {
            println!("{name}: {value:?}");
            Ok(())
        }
        read => Err(format!("{name}: wrote {value:?} but read back {read:?}").into()),
    }
}

fn failures_are_reported(context: &Rc<GlowContext<glow::Context>>) -> Result<(), Box<dyn Error>> {
    let cases = [
        ("broken.vert", "basic.frag", Stage::VertexCompile),
        ("basic.vert", "broken.frag", Stage::FragmentCompile),
        ("basic.vert", "mismatched.frag", Stage::Link),
    ];

    for (vertex, fragment, stage) in cases {
        let program =
            ShaderProgram::from_files(context.clone(), shader_path(vertex), shader_path(fragment))?;
        let report = program.report();

        for failure in report.failures() {
            println!("{vertex} + {fragment}: {failure}");
        }

        if program.is_linked() {
            return Err(format!("{vertex} + {fragment} linked").into());
        }
        if report.failure(stage).is_none() {
            return Err(format!("{vertex} + {fragment} reported no {stage} failure").into());
        }
    }

    Ok(())
}
