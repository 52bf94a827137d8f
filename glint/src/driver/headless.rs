use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{BufferTarget, BufferUsage, Driver, DriverErrorCode, Handle, ObjectKind};
use crate::GlintError;
use crate::resource::{ImageData, Sampling, VertexAttribute};
use crate::shader::ShaderKind;

#[derive(Debug)]
enum Object {
    Shader {
        kind: ShaderKind,
        source: Vec<u8>,
        log: String,
        compiled: bool,
    },
    Program {
        linked: bool,
        log: String,
    },
    Buffer {
        target: BufferTarget,
        usage: BufferUsage,
        data: Vec<u8>,
    },
    Texture {
        extent: Option<(u32, u32, u8)>,
        sampling: Sampling,
    },
    VertexArray {
        attributes: Vec<(Handle, VertexAttribute)>,
        index_buffer: Option<Handle>,
    },
}

#[derive(Debug, Default)]
struct State {
    next: u32,
    objects: HashMap<Handle, Object>,
    errors: VecDeque<DriverErrorCode>,
}

impl State {
    /// Records `code` on the error stack the way a driver would, and hands it back as an error
    fn fail(&mut self, code: DriverErrorCode) -> GlintError {
        self.errors.push_back(code);
        GlintError::Driver(code)
    }

    fn object_mut(&mut self, handle: Handle) -> Result<&mut Object, GlintError> {
        if !self.objects.contains_key(&handle) {
            self.errors.push_back(DriverErrorCode::InvalidValue);
            return Err(GlintError::InvalidHandle(handle.raw()));
        }
        self.objects
            .get_mut(&handle)
            .ok_or(GlintError::InvalidHandle(handle.raw()))
    }
}

/// A driver with no GPU behind it
///
/// Objects live in host memory. A shader compiles when its source is UTF-8 and opens with a
/// `#version` directive; a program links when every attached stage compiled. Misuse is pushed
/// onto the error stack like a real driver would.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDriver {
    state: Arc<Mutex<State>>,
}

impl HeadlessDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of objects allocated and not yet released
    pub fn live_objects(&self) -> usize {
        self.state().objects.len()
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        self.state().objects.contains_key(&handle)
    }

    /// Whether `program` linked, [`None`] if it is not a live program
    pub fn is_linked(&self, program: Handle) -> Option<bool> {
        match self.state().objects.get(&program) {
            Some(Object::Program { linked, .. }) => Some(*linked),
            _ => None,
        }
    }

    pub fn shader_source(&self, shader: Handle) -> Option<Vec<u8>> {
        match self.state().objects.get(&shader) {
            Some(Object::Shader { source, .. }) => Some(source.clone()),
            _ => None,
        }
    }

    pub fn buffer_data(&self, buffer: Handle) -> Option<Vec<u8>> {
        match self.state().objects.get(&buffer) {
            Some(Object::Buffer { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn buffer_usage(&self, buffer: Handle) -> Option<BufferUsage> {
        match self.state().objects.get(&buffer) {
            Some(Object::Buffer { usage, .. }) => Some(*usage),
            _ => None,
        }
    }

    /// `(width, height, channels)` of a texture with defined storage
    pub fn texture_extent(&self, texture: Handle) -> Option<(u32, u32, u8)> {
        match self.state().objects.get(&texture) {
            Some(Object::Texture { extent, .. }) => *extent,
            _ => None,
        }
    }

    pub fn texture_sampling(&self, texture: Handle) -> Option<Sampling> {
        match self.state().objects.get(&texture) {
            Some(Object::Texture { sampling, .. }) => Some(*sampling),
            _ => None,
        }
    }

    pub fn vertex_attributes(&self, vertex_array: Handle) -> Option<Vec<VertexAttribute>> {
        match self.state().objects.get(&vertex_array) {
            Some(Object::VertexArray { attributes, .. }) => {
                Some(attributes.iter().map(|(_, attribute)| *attribute).collect())
            }
            _ => None,
        }
    }

    pub fn index_buffer(&self, vertex_array: Handle) -> Option<Handle> {
        match self.state().objects.get(&vertex_array) {
            Some(Object::VertexArray { index_buffer, .. }) => *index_buffer,
            _ => None,
        }
    }
}

/// Checks a shader source the way the headless driver "compiles" it
fn check_source(source: &[u8]) -> Result<(), String> {
    let text = std::str::from_utf8(source)
        .map_err(|err| format!("0:0: error: source is not valid UTF-8 ({err})"))?;
    let first = text
        .lines()
        .enumerate()
        .find(|(_, line)| !line.trim().is_empty());
    match first {
        None => Err(String::from("0:0: error: empty shader source")),
        Some((_, line)) if line.trim_start().starts_with("#version") => Ok(()),
        Some((number, _)) => Err(format!(
            "0:{}: error: expected #version directive",
            number + 1
        )),
    }
}

impl Driver for HeadlessDriver {
    fn allocate(&self, kind: ObjectKind) -> Result<Handle, GlintError> {
        let mut state = self.state.lock()?;
        let raw = state
            .next
            .checked_add(1)
            .ok_or(GlintError::HandlesExhausted)?;
        let handle = Handle::new(raw).ok_or(GlintError::HandlesExhausted)?;
        state.next = raw;
        let object = match kind {
            ObjectKind::Shader(kind) => Object::Shader {
                kind,
                source: Vec::new(),
                log: String::new(),
                compiled: false,
            },
            ObjectKind::Program => Object::Program {
                linked: false,
                log: String::new(),
            },
            ObjectKind::Buffer { target, usage } => Object::Buffer {
                target,
                usage,
                data: Vec::new(),
            },
            ObjectKind::Texture => Object::Texture {
                extent: None,
                sampling: Sampling::default(),
            },
            ObjectKind::VertexArray => Object::VertexArray {
                attributes: Vec::new(),
                index_buffer: None,
            },
        };
        state.objects.insert(handle, object);
        Ok(handle)
    }

    fn upload(&self, handle: Handle, data: &[u8]) -> Result<(), GlintError> {
        let mut state = self.state.lock()?;
        match state.object_mut(handle)? {
            Object::Shader { source, .. } => *source = data.to_vec(),
            Object::Buffer { data: stored, .. } => *stored = data.to_vec(),
            _ => return Err(state.fail(DriverErrorCode::InvalidOperation)),
        }
        Ok(())
    }

    fn upload_image(
        &self,
        handle: Handle,
        image: &ImageData,
        sampling: &Sampling,
    ) -> Result<(), GlintError> {
        let mut state = self.state.lock()?;
        match state.object_mut(handle)? {
            Object::Texture {
                extent,
                sampling: stored,
            } => {
                *extent = Some((image.width, image.height, image.channels));
                *stored = *sampling;
                Ok(())
            }
            _ => Err(state.fail(DriverErrorCode::InvalidOperation)),
        }
    }

    fn compile(&self, handle: Handle) -> Result<bool, GlintError> {
        let mut state = self.state.lock()?;
        match state.object_mut(handle)? {
            Object::Shader {
                source,
                log,
                compiled,
                ..
            } => {
                match check_source(source) {
                    Ok(()) => {
                        log.clear();
                        *compiled = true;
                    }
                    Err(message) => {
                        *log = message;
                        *compiled = false;
                    }
                }
                Ok(*compiled)
            }
            _ => Err(state.fail(DriverErrorCode::InvalidOperation)),
        }
    }

    fn get_log(&self, handle: Handle) -> Result<String, GlintError> {
        let mut state = self.state.lock()?;
        match state.object_mut(handle)? {
            Object::Shader { log, .. } | Object::Program { log, .. } => Ok(log.clone()),
            _ => Err(state.fail(DriverErrorCode::InvalidOperation)),
        }
    }

    fn link(&self, stages: &[Handle]) -> Result<Handle, GlintError> {
        let mut failures = Vec::new();
        {
            let mut state = self.state.lock()?;
            for stage in stages {
                match state.object_mut(*stage)? {
                    Object::Shader {
                        kind, compiled, ..
                    } => {
                        if !*compiled {
                            failures.push(*kind);
                        }
                    }
                    _ => return Err(state.fail(DriverErrorCode::InvalidOperation)),
                }
            }
        }
        let program = self.allocate(ObjectKind::Program)?;
        let mut state = self.state.lock()?;
        if let Some(Object::Program { linked, log }) = state.objects.get_mut(&program) {
            if stages.is_empty() {
                *log = String::from("error: no shader stages attached");
            } else if !failures.is_empty() {
                *log = failures
                    .iter()
                    .map(|kind| format!("error: {kind} stage is not compiled"))
                    .collect::<Vec<_>>()
                    .join("\n");
            } else {
                *linked = true;
            }
        }
        Ok(program)
    }

    fn set_vertex_attribute(
        &self,
        vertex_array: Handle,
        buffer: Handle,
        attribute: &VertexAttribute,
    ) -> Result<(), GlintError> {
        let mut state = self.state.lock()?;
        match state.object_mut(buffer)? {
            Object::Buffer {
                target: BufferTarget::Vertex,
                ..
            } => {}
            _ => return Err(state.fail(DriverErrorCode::InvalidOperation)),
        }
        match state.object_mut(vertex_array)? {
            Object::VertexArray { attributes, .. } => {
                attributes.retain(|(_, existing)| existing.index != attribute.index);
                attributes.push((buffer, *attribute));
                Ok(())
            }
            _ => Err(state.fail(DriverErrorCode::InvalidOperation)),
        }
    }

    fn set_index_buffer(&self, vertex_array: Handle, buffer: Handle) -> Result<(), GlintError> {
        let mut state = self.state.lock()?;
        match state.object_mut(buffer)? {
            Object::Buffer {
                target: BufferTarget::Index,
                ..
            } => {}
            _ => return Err(state.fail(DriverErrorCode::InvalidOperation)),
        }
        match state.object_mut(vertex_array)? {
            Object::VertexArray { index_buffer, .. } => {
                *index_buffer = Some(buffer);
                Ok(())
            }
            _ => Err(state.fail(DriverErrorCode::InvalidOperation)),
        }
    }

    fn release(&self, handle: Handle) {
        let mut state = self.state();
        if state.objects.remove(&handle).is_none() {
            state.errors.push_back(DriverErrorCode::InvalidValue);
        }
    }

    fn pop_error(&self) -> Option<DriverErrorCode> {
        self.state().errors.pop_front()
    }
}
