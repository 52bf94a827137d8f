use std::path::PathBuf;

use bytes::Bytes;
use glint::shader::ShaderKind;

/// Data belonging to one shader stage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stage<T> {
    pub kind: ShaderKind,
    pub data: T,
}

impl<T> Stage<T> {
    pub fn new(kind: ShaderKind, data: T) -> Self {
        Self { kind, data }
    }

    pub fn vertex(data: T) -> Self {
        Self::new(ShaderKind::Vertex, data)
    }

    pub fn fragment(data: T) -> Self {
        Self::new(ShaderKind::Fragment, data)
    }

    pub fn geometry(data: T) -> Self {
        Self::new(ShaderKind::Geometry, data)
    }

    pub fn compute(data: T) -> Self {
        Self::new(ShaderKind::Compute, data)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Stage<U> {
        Stage {
            kind: self.kind,
            data: f(self.data),
        }
    }
}

/// Where the content of a resource comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Files read by [`crate::Resource::load`], in stage order
    FilePaths(Vec<Stage<PathBuf>>),
    /// Content handed over directly by the caller
    InlineContent(Vec<Stage<Bytes>>),
}

impl Source {
    pub fn kinds(&self) -> Vec<ShaderKind> {
        match self {
            Source::FilePaths(stages) => stages.iter().map(|stage| stage.kind).collect(),
            Source::InlineContent(stages) => stages.iter().map(|stage| stage.kind).collect(),
        }
    }
}

/// The common vertex + fragment pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl ShaderPaths {
    pub fn new(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

impl IntoIterator for ShaderPaths {
    type Item = Stage<PathBuf>;
    type IntoIter = std::array::IntoIter<Stage<PathBuf>, 2>;

    fn into_iter(self) -> Self::IntoIter {
        [Stage::vertex(self.vertex), Stage::fragment(self.fragment)].into_iter()
    }
}
