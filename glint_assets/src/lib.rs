//! Loading GPU resources from files or memory.
//!
//! A [`Resource`] walks from its source to a linked driver object through the states in
//! [`ResourceState`]. File reads may happen on a tokio task; everything touching the driver stays
//! on the caller's thread.

pub mod error;
pub mod image;
pub mod loader;
pub mod report;
pub mod resource;
pub mod source;
pub mod state;
mod task;
#[cfg(test)]
mod testing;

pub use error::LoaderError;
pub use report::{CompileReport, StageLog};
pub use resource::Resource;
pub use source::{ShaderPaths, Source, Stage};
pub use state::{LoadMode, ResourceState};
pub use task::{LoadHandle, Loading};
