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

// An in-memory driver that understands just enough GLSL to behave like a real one.

#![allow(dead_code)]

use shader_program::{DriverError, ShaderContext, ShaderStage, UniformKind, UniformValue};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;

pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

pub fn shader_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/shaders")
        .join(name)
}

#[derive(Debug, Clone)]
pub struct Location {
    program: u32,
    index: usize,
}

struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
    deleted: bool,
}

struct UniformSlot {
    name: String,
    kind: UniformKind,
    arity: usize,
    value: UniformValue,
}

#[derive(Default)]
struct ProgramObject {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: Vec<UniformSlot>,
    deleted: bool,
}

#[derive(Default)]
struct State {
    next_id: u32,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    current: Option<u32>,
    dropped_writes: usize,
    errors: Vec<&'static str>,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MockContext {
    state: RefCell<State>,
    fail_create_program: Cell<bool>,
}

impl MockContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_program` call fail.
    pub fn fail_next_program(&self) {
        self.fail_create_program.set(true);
    }

    pub fn live_shaders(&self) -> usize {
        self.state
            .borrow()
            .shaders
            .values()
            .filter(|s| !s.deleted)
            .count()
    }

    pub fn live_programs(&self) -> usize {
        self.state
            .borrow()
            .programs
            .values()
            .filter(|p| !p.deleted)
            .count()
    }

    pub fn attached_shaders(&self, program: u32) -> usize {
        self.state.borrow().programs[&program].attached.len()
    }

    pub fn dropped_writes(&self) -> usize {
        self.state.borrow().dropped_writes
    }

    pub fn errors(&self) -> Vec<&'static str> {
        self.state.borrow().errors.clone()
    }

    /// Every uniform value stored in a program, by name.
    pub fn uniform_values(&self, program: u32) -> Vec<(String, UniformValue)> {
        self.state.borrow().programs[&program]
            .uniforms
            .iter()
            .map(|u| (u.name.clone(), u.value.clone()))
            .collect()
    }
}

impl ShaderContext for MockContext {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = Location;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.shaders.insert(
            id,
            ShaderObject {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
                deleted: false,
            },
        );
        Ok(id)
    }

    fn compile_shader(&self, shader: u32, source: &str) {
        let mut state = self.state.borrow_mut();
        let object = state.shaders.get_mut(&shader).expect("unknown shader");
        object.source = source.to_owned();

        match check_syntax(source) {
            Ok(()) => {
                object.compiled = true;
                object.log.clear();
            }
            Err(log) => {
                object.compiled = false;
                object.log = log;
            }
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state.borrow().shaders[&shader].compiled
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state.borrow().shaders[&shader].log.clone()
    }

    fn delete_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        let attached = state
            .programs
            .values()
            .any(|p| !p.deleted && p.attached.contains(&shader));
        assert!(!attached, "shader {shader} deleted while still attached");

        state.shaders.get_mut(&shader).expect("unknown shader").deleted = true;
    }

    fn create_program(&self) -> Result<u32, DriverError> {
        if self.fail_create_program.replace(false) {
            return Err(DriverError::new("out of memory"));
        }

        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.programs.insert(id, ProgramObject::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        let program = state.programs.get_mut(&program).expect("unknown program");
        program.attached.push(shader);
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        let program = state.programs.get_mut(&program).expect("unknown program");
        program.attached.retain(|&s| s != shader);
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let result = link(&state, program);
        let object = state.programs.get_mut(&program).expect("unknown program");

        match result {
            Ok(uniforms) => {
                object.linked = true;
                object.log.clear();
                object.uniforms = uniforms;
            }
            Err(log) => {
                object.linked = false;
                object.log = log;
                object.uniforms.clear();
            }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state.borrow().programs[&program].linked
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state.borrow().programs[&program].log.clone()
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let object = state.programs.get_mut(&program).expect("unknown program");
        assert!(!object.deleted, "program {program} deleted twice");
        object.deleted = true;
    }

    fn use_program(&self, program: Option<u32>) {
        let mut state = self.state.borrow_mut();
        match program {
            Some(id) if !state.programs[&id].linked => state.errors.push("GL_INVALID_OPERATION"),
            _ => state.current = program,
        }
    }

    fn current_program(&self) -> Option<u32> {
        self.state.borrow().current
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<Location> {
        let state = self.state.borrow();
        let object = &state.programs[&program];
        if !object.linked {
            return None;
        }

        object
            .uniforms
            .iter()
            .position(|u| u.name == name)
            .map(|index| Location { program, index })
    }

    fn write_uniform(&self, location: Option<&Location>, value: &UniformValue) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let location = match location {
            Some(location) => location,
            None => {
                state.dropped_writes += 1;
                return;
            }
        };

        // Like the real thing, writes land in whichever program is current.
        let current = match state.current {
            Some(current) => current,
            None => {
                state.errors.push("GL_INVALID_OPERATION");
                return;
            }
        };

        let slot = state
            .programs
            .get_mut(&current)
            .and_then(|p| p.uniforms.get_mut(location.index));
        match slot {
            Some(slot) if slot.kind == value.kind() && slot.arity == value.arity() => {
                slot.value = value.clone();
            }
            _ => state.errors.push("GL_INVALID_OPERATION"),
        }
    }

    fn read_uniform(
        &self,
        program: u32,
        location: &Location,
        kind: UniformKind,
        arity: usize,
    ) -> UniformValue {
        assert_eq!(location.program, program, "location from another program");

        let state = self.state.borrow();
        let slot = &state.programs[&program].uniforms[location.index];
        let value = match (&slot.value, kind) {
            (UniformValue::Int(v), UniformKind::Int) => UniformValue::from_ints(v),
            (UniformValue::Float(v), UniformKind::Float) => UniformValue::from_floats(v),
            (UniformValue::Int(v), UniformKind::Float) => {
                UniformValue::from_floats(&v.iter().map(|&i| i as f32).collect::<Vec<_>>())
            }
            (UniformValue::Float(v), UniformKind::Int) => {
                UniformValue::from_ints(&v.iter().map(|&f| f as i32).collect::<Vec<_>>())
            }
        }
        .expect("uniform with no components");

        match value {
            UniformValue::Int(v) => UniformValue::from_ints(&v[..arity.min(v.len())]),
            UniformValue::Float(v) => UniformValue::from_floats(&v[..arity.min(v.len())]),
        }
        .expect("uniform with no components")
    }
}

fn check_syntax(source: &str) -> Result<(), String> {
    let lines = source.lines().count().max(1);

    if source.trim().is_empty() {
        return Err("0:1(1): error: syntax error, unexpected end of file".into());
    }

    let mut depth = 0i32;
    for (number, line) in source.lines().enumerate() {
        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }

            if depth < 0 {
                return Err(format!("0:{}(1): error: syntax error, unexpected '}}'", number + 1));
            }
        }
    }

    if depth != 0 {
        return Err(format!(
            "0:{lines}(1): error: syntax error, unexpected end of file, expecting '}}'"
        ));
    }

    if !source.contains("void main()") {
        return Err("error: function `main' is not defined".into());
    }

    Ok(())
}

/// A `qualifier type name;` declaration at global scope.
struct Declaration<'a> {
    qualifier: &'a str,
    ty: &'a str,
    name: &'a str,
}

fn declarations(source: &str) -> impl Iterator<Item = Declaration<'_>> {
    source.lines().filter_map(|line| {
        let mut line = line.trim();
        if line.starts_with("layout") {
            line = &line[line.rfind(')')? + 1..];
        }

        let mut tokens = line.split_whitespace();
        let qualifier = tokens.next()?;
        if !matches!(qualifier, "in" | "out" | "uniform") {
            return None;
        }

        let ty = tokens.next()?;
        let name = tokens.next()?.strip_suffix(';')?;
        Some(Declaration {
            qualifier,
            ty,
            name,
        })
    })
}

/// How many times `name` appears in `source` as a whole identifier.
fn mentions(source: &str, name: &str) -> usize {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';

    source
        .match_indices(name)
        .filter(|&(idx, _)| {
            let before = source[..idx].chars().next_back();
            let after = source[idx + name.len()..].chars().next();
            !before.map_or(false, is_ident) && !after.map_or(false, is_ident)
        })
        .count()
}

fn uniform_type(ty: &str) -> Option<(UniformKind, usize)> {
    let (kind, arity) = match ty {
        "bool" | "int" => (UniformKind::Int, 1),
        "float" => (UniformKind::Float, 1),
        _ => {
            let arity = ty.chars().last()?.to_digit(10)? as usize;
            let kind = match &ty[..ty.len() - 1] {
                "bvec" | "ivec" => UniformKind::Int,
                "vec" => UniformKind::Float,
                _ => return None,
            };
            (kind, arity)
        }
    };

    Some((kind, arity))
}

fn link(state: &State, program: u32) -> Result<Vec<UniformSlot>, String> {
    let object = &state.programs[&program];
    let stage = |stage| {
        object
            .attached
            .iter()
            .map(|id| &state.shaders[id])
            .find(|s| s.stage == stage)
    };

    let (vertex, fragment) = match (stage(ShaderStage::Vertex), stage(ShaderStage::Fragment)) {
        (Some(v), Some(f)) => (v, f),
        _ => return Err("error: program is missing a vertex or fragment shader".into()),
    };

    for shader in [vertex, fragment] {
        if !shader.compiled {
            return Err(format!(
                "error: linking with uncompiled/unspecialized {} shader",
                shader.stage
            ));
        }
    }

    for input in declarations(&fragment.source).filter(|d| d.qualifier == "in") {
        let matched = declarations(&vertex.source)
            .any(|d| d.qualifier == "out" && d.name == input.name && d.ty == input.ty);
        if !matched {
            return Err(format!(
                "error: fragment shader input `{}' has no matching output in the vertex shader",
                input.name
            ));
        }
    }

    let mut uniforms: Vec<UniformSlot> = Vec::new();
    for shader in [vertex, fragment] {
        for decl in declarations(&shader.source).filter(|d| d.qualifier == "uniform") {
            // Unused uniforms are optimized out.
            if mentions(&shader.source, decl.name) < 2
                || uniforms.iter().any(|u| u.name == decl.name)
            {
                continue;
            }

            let (kind, arity) = uniform_type(decl.ty)
                .ok_or_else(|| format!("error: unsupported uniform type `{}'", decl.ty))?;
            let value = match kind {
                UniformKind::Int => UniformValue::from_ints(&[0; 4][..arity]),
                UniformKind::Float => UniformValue::from_floats(&[0.0; 4][..arity]),
            }
            .expect("uniform arity out of range");

            uniforms.push(UniformSlot {
                name: decl.name.to_owned(),
                kind,
                arity,
                value,
            });
        }
    }

    Ok(uniforms)
}
