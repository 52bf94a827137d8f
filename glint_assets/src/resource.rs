use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use glint::shader::ShaderKind;
use glint::{Driver, GlintError, Handle, ObjectKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::LoaderError;
use crate::report::{CompileReport, StageLog};
use crate::source::{Source, Stage};
use crate::state::{LoadMode, ResourceState};
use crate::task::{self, LoadHandle, Loading};

/// Marks a resource as owned by a background load
#[derive(Debug)]
pub(crate) struct InFlight {
    pub ticket: u64,
    pub token: CancellationToken,
}

/// Lifecycle record, the only part of a [`Resource`] a load task may touch
#[derive(Debug, Default)]
pub(crate) struct Shared {
    pub state: ResourceState,
    pub source: Option<Source>,
    pub content: Vec<Stage<Bytes>>,
    pub in_flight: Option<InFlight>,
}

impl Shared {
    fn file_paths(&self) -> Option<Vec<Stage<PathBuf>>> {
        match &self.source {
            Some(Source::FilePaths(paths)) => Some(paths.clone()),
            _ => None,
        }
    }
}

/// Locks the lifecycle record for a mutating operation
///
/// A pending load makes every mutation fail with [`LoaderError::ResourceBusy`] before the state is
/// even considered.
fn acquire<'a>(
    shared: &'a Mutex<Shared>,
    operation: &'static str,
    allowed: &[ResourceState],
) -> Result<MutexGuard<'a, Shared>, LoaderError> {
    let guard = shared.lock()?;
    if guard.in_flight.is_some() {
        return Err(LoaderError::ResourceBusy);
    }
    if !allowed.contains(&guard.state) {
        return Err(LoaderError::InvalidState {
            operation,
            state: guard.state,
        });
    }
    Ok(guard)
}

#[derive(Debug, Copy, Clone)]
struct CompiledStage {
    kind: ShaderKind,
    handle: Handle,
    success: bool,
}

fn compile_stage<D: Driver>(driver: &D, stage: &Stage<Bytes>) -> Result<CompiledStage, GlintError> {
    let handle = driver.allocate(ObjectKind::Shader(stage.kind))?;
    let compiled = driver
        .upload(handle, &stage.data)
        .and_then(|()| driver.compile(handle));
    match compiled {
        Ok(success) => {
            if !success {
                warn!(stage = %stage.kind, %handle, "Shader stage failed to compile");
            }
            Ok(CompiledStage {
                kind: stage.kind,
                handle,
                success,
            })
        }
        Err(err) => {
            driver.release(handle);
            Err(err)
        }
    }
}

fn release_objects<D: Driver>(
    driver: &D,
    stages: &mut Vec<CompiledStage>,
    program: &mut Option<Handle>,
) {
    for stage in stages.drain(..) {
        driver.release(stage.handle);
    }
    if let Some(program) = program.take() {
        driver.release(program);
    }
}

/// A shader program driven from its sources to a linked driver object
///
/// Compiling and linking talk to the driver and happen on the calling thread. Only reading the
/// files may happen in the background, see [`Resource::load_async`].
#[derive(Debug)]
pub struct Resource<D: Driver> {
    driver: D,
    shared: Arc<Mutex<Shared>>,
    /// Per-stage objects, only present while compiled
    stages: Vec<CompiledStage>,
    /// Linked program
    driver_handle: Option<Handle>,
}

impl<D: Driver> Resource<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            shared: Arc::new(Mutex::new(Shared::default())),
            stages: Vec::new(),
            driver_handle: None,
        }
    }

    /// Create a resource and point it at files
    pub fn from_paths<I, P>(driver: D, paths: I) -> Result<Self, LoaderError>
    where
        I: IntoIterator<Item = Stage<P>>,
        P: Into<PathBuf>,
    {
        let mut resource = Self::new(driver);
        resource.set_source_paths(paths)?;
        Ok(resource)
    }

    /// Create a resource from content already in memory
    pub fn from_content<I, B>(driver: D, stages: I) -> Result<Self, LoaderError>
    where
        I: IntoIterator<Item = Stage<B>>,
        B: Into<Bytes>,
    {
        let mut resource = Self::new(driver);
        resource.set_inline_content(stages)?;
        Ok(resource)
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_source_paths<I, P>(&mut self, paths: I) -> Result<(), LoaderError>
    where
        I: IntoIterator<Item = Stage<P>>,
        P: Into<PathBuf>,
    {
        let mut shared = acquire(&self.shared, "set source paths for", &[ResourceState::Empty])?;
        let paths: Vec<Stage<PathBuf>> = paths
            .into_iter()
            .map(|stage| stage.map(Into::into))
            .collect();
        if paths.is_empty() {
            return Err(LoaderError::EmptySource);
        }
        debug!(stages = paths.len(), "Resource found its paths");
        shared.source = Some(Source::FilePaths(paths));
        shared.state = ResourceState::FoundPath;
        Ok(())
    }

    /// Hand over content directly, replacing any file source that was set
    pub fn set_inline_content<I, B>(&mut self, stages: I) -> Result<(), LoaderError>
    where
        I: IntoIterator<Item = Stage<B>>,
        B: Into<Bytes>,
    {
        let mut shared = acquire(
            &self.shared,
            "set inline content for",
            &[ResourceState::Empty, ResourceState::FoundPath],
        )?;
        let content: Vec<Stage<Bytes>> = stages
            .into_iter()
            .map(|stage| stage.map(Into::into))
            .collect();
        if content.is_empty() {
            return Err(LoaderError::EmptySource);
        }
        debug!(stages = content.len(), "Resource received inline content");
        shared.source = Some(Source::InlineContent(content.clone()));
        shared.content = content;
        shared.state = ResourceState::Content;
        Ok(())
    }

    pub fn load(&mut self, mode: LoadMode) -> Result<Loading, LoaderError> {
        match mode {
            LoadMode::Sync => self.load_blocking().map(|()| Loading::Complete),
            LoadMode::Async => self.load_async().map(Loading::Pending),
        }
    }

    /// Read every file on the calling thread
    ///
    /// On failure the resource stays in [`ResourceState::FoundPath`] with no content and the load
    /// may be retried.
    pub fn load_blocking(&mut self) -> Result<(), LoaderError> {
        let mut shared = acquire(&self.shared, "load", &[ResourceState::FoundPath])?;
        let paths = shared.file_paths().ok_or(LoaderError::InvalidState {
            operation: "load",
            state: shared.state,
        })?;
        let content = task::read_stages_blocking(&paths)?;
        debug!(stages = content.len(), "Resource loaded");
        shared.content = content;
        shared.state = ResourceState::Content;
        Ok(())
    }

    /// Start reading the files on the current tokio runtime
    ///
    /// Until the returned handle finishes, every mutating operation fails with
    /// [`LoaderError::ResourceBusy`].
    pub fn load_async(&mut self) -> Result<LoadHandle, LoaderError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| LoaderError::NoRuntime)?;
        let mut shared = acquire(&self.shared, "load", &[ResourceState::FoundPath])?;
        let paths = shared.file_paths().ok_or(LoaderError::InvalidState {
            operation: "load",
            state: shared.state,
        })?;
        Ok(task::spawn_load(&runtime, &self.shared, &mut shared, paths))
    }

    /// Compile every stage
    ///
    /// A stage the driver rejects still counts as compiled; inspect [`Resource::get_log`] to find
    /// out. Driver errors release whatever was allocated and leave the resource untouched.
    pub fn compile(&mut self) -> Result<(), LoaderError> {
        let mut shared = acquire(&self.shared, "compile", &[ResourceState::Content])?;
        let mut stages = Vec::with_capacity(shared.content.len());
        for stage in &shared.content {
            match compile_stage(&self.driver, stage) {
                Ok(compiled) => stages.push(compiled),
                Err(err) => {
                    for compiled in stages {
                        self.driver.release(compiled.handle);
                    }
                    return Err(err.into());
                }
            }
        }
        debug!(stages = stages.len(), "Resource compiled");
        self.stages = stages;
        shared.state = ResourceState::Compiled;
        Ok(())
    }

    /// Compile diagnostics, only available between compiling and linking
    pub fn get_log(&self) -> Result<CompileReport, LoaderError> {
        let _shared = acquire(&self.shared, "read the compile log of", &[ResourceState::Compiled])?;
        let stages = self
            .stages
            .iter()
            .map(|stage| {
                Ok(StageLog {
                    kind: stage.kind,
                    success: stage.success,
                    log: self.driver.get_log(stage.handle)?,
                })
            })
            .collect::<Result<Vec<_>, GlintError>>()?;
        Ok(CompileReport::new(stages))
    }

    /// Link the compiled stages into a program and drop the stages
    pub fn link(&mut self) -> Result<Handle, LoaderError> {
        let mut shared = acquire(&self.shared, "link", &[ResourceState::Compiled])?;
        let handles: Vec<Handle> = self.stages.iter().map(|stage| stage.handle).collect();
        let program = self.driver.link(&handles)?;
        if self.stages.iter().any(|stage| !stage.success) {
            warn!(%program, "Linked a program from stages that failed to compile");
        }
        for stage in self.stages.drain(..) {
            self.driver.release(stage.handle);
        }
        debug!(%program, "Resource linked");
        self.driver_handle = Some(program);
        shared.state = ResourceState::Linked;
        Ok(program)
    }

    /// Load if needed, then compile and link
    ///
    /// Does not return before a background load has been joined.
    pub async fn full_load(&mut self, mode: LoadMode) -> Result<Handle, LoaderError> {
        if self.state() == ResourceState::FoundPath {
            self.load(mode)?.wait().await?;
        }
        self.compile()?;
        self.link()
    }

    /// [`Resource::full_load`] without a runtime
    pub fn full_load_blocking(&mut self) -> Result<Handle, LoaderError> {
        if self.state() == ResourceState::FoundPath {
            self.load_blocking()?;
        }
        self.compile()?;
        self.link()
    }

    /// Release every driver object and drop the content
    ///
    /// Destroying twice is a no-op. Fails while a load is in flight; join or cancel it first.
    pub fn destroy(&mut self) -> Result<(), LoaderError> {
        let mut shared = self.shared.lock()?;
        if shared.state == ResourceState::Destroyed {
            return Ok(());
        }
        if shared.in_flight.is_some() {
            return Err(LoaderError::ResourceBusy);
        }
        release_objects(&self.driver, &mut self.stages, &mut self.driver_handle);
        shared.content.clear();
        shared.state = ResourceState::Destroyed;
        debug!("Resource destroyed");
        Ok(())
    }

    pub fn state(&self) -> ResourceState {
        self.shared().state
    }

    pub fn source(&self) -> Option<Source> {
        self.shared().source.clone()
    }

    pub fn content(&self) -> Vec<Stage<Bytes>> {
        self.shared().content.clone()
    }

    /// The linked program, [`None`] unless linked
    pub fn driver_handle(&self) -> Option<Handle> {
        self.driver_handle
    }

    /// Whether an asynchronous load owns the resource
    pub fn is_busy(&self) -> bool {
        self.shared().in_flight.is_some()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

#[cfg(feature = "raii")]
impl<D: Driver> Drop for Resource<D> {
    fn drop(&mut self) {
        let mut shared = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(in_flight) = &shared.in_flight {
            in_flight.token.cancel();
        }
        if shared.state != ResourceState::Destroyed {
            release_objects(&self.driver, &mut self.stages, &mut self.driver_handle);
            shared.content.clear();
            shared.state = ResourceState::Destroyed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ShaderPaths;
    use crate::testing::{FRAGMENT, VERTEX, write_shader};
    use glint::resource::{ImageData, Sampling, VertexAttribute};
    use glint::{DriverErrorCode, HeadlessDriver};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Runs out of memory on uploads ending in `OOM` while `fail` is set
    #[derive(Debug, Clone, Default)]
    struct OutOfMemoryOnUpload {
        inner: HeadlessDriver,
        fail: Arc<AtomicBool>,
    }

    impl Driver for OutOfMemoryOnUpload {
        fn allocate(&self, kind: ObjectKind) -> Result<Handle, GlintError> {
            self.inner.allocate(kind)
        }

        fn upload(&self, handle: Handle, data: &[u8]) -> Result<(), GlintError> {
            if self.fail.load(Ordering::SeqCst) && data.ends_with(b"OOM") {
                return Err(GlintError::Driver(DriverErrorCode::OutOfMemory));
            }
            self.inner.upload(handle, data)
        }

        fn upload_image(
            &self,
            handle: Handle,
            image: &ImageData,
            sampling: &Sampling,
        ) -> Result<(), GlintError> {
            self.inner.upload_image(handle, image, sampling)
        }

        fn compile(&self, handle: Handle) -> Result<bool, GlintError> {
            self.inner.compile(handle)
        }

        fn get_log(&self, handle: Handle) -> Result<String, GlintError> {
            self.inner.get_log(handle)
        }

        fn link(&self, stages: &[Handle]) -> Result<Handle, GlintError> {
            self.inner.link(stages)
        }

        fn set_vertex_attribute(
            &self,
            vertex_array: Handle,
            buffer: Handle,
            attribute: &VertexAttribute,
        ) -> Result<(), GlintError> {
            self.inner.set_vertex_attribute(vertex_array, buffer, attribute)
        }

        fn set_index_buffer(&self, vertex_array: Handle, buffer: Handle) -> Result<(), GlintError> {
            self.inner.set_index_buffer(vertex_array, buffer)
        }

        fn release(&self, handle: Handle) {
            self.inner.release(handle)
        }

        fn pop_error(&self) -> Option<DriverErrorCode> {
            self.inner.pop_error()
        }
    }

    fn shader_files(dir: &tempfile::TempDir) -> ShaderPaths {
        ShaderPaths::new(
            write_shader(dir, "v.glsl", VERTEX),
            write_shader(dir, "f.glsl", FRAGMENT),
        )
    }

    fn assert_invalid<T: std::fmt::Debug>(
        result: Result<T, LoaderError>,
        expected: ResourceState,
    ) {
        match result {
            Err(LoaderError::InvalidState { state, .. }) => assert_eq!(state, expected),
            other => panic!("expected an invalid state error, got {other:?}"),
        }
    }

    #[test]
    fn test_full_load_blocking() {
        let dir = tempfile::tempdir().unwrap();
        let driver = HeadlessDriver::new();
        let mut resource = Resource::from_paths(driver.clone(), shader_files(&dir)).unwrap();

        let program = resource.full_load_blocking().unwrap();
        assert_eq!(resource.state(), ResourceState::Linked);
        assert_eq!(resource.driver_handle(), Some(program));
        assert_ne!(program.raw(), 0);
        assert_eq!(driver.is_linked(program), Some(true));
        assert_eq!(driver.live_objects(), 1);
    }

    #[tokio::test]
    async fn test_full_load_async() {
        let dir = tempfile::tempdir().unwrap();
        let driver = HeadlessDriver::new();
        let mut resource = Resource::from_paths(driver.clone(), shader_files(&dir)).unwrap();

        let program = resource.full_load(LoadMode::Async).await.unwrap();
        assert_eq!(resource.state(), ResourceState::Linked);
        assert!(!resource.is_busy());
        assert_eq!(driver.is_linked(program), Some(true));
    }

    #[test]
    fn test_missing_file_keeps_found_path() {
        let dir = tempfile::tempdir().unwrap();
        let vertex = write_shader(&dir, "v.glsl", VERTEX);
        let missing = dir.path().join("missing.glsl");
        let mut resource =
            Resource::from_paths(HeadlessDriver::new(), ShaderPaths::new(vertex, &missing)).unwrap();

        match resource.load_blocking() {
            Err(LoaderError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected an io error, got {other:?}"),
        }
        assert_eq!(resource.state(), ResourceState::FoundPath);
        assert!(resource.content().is_empty());

        // Retrying succeeds once the file shows up
        std::fs::write(&missing, FRAGMENT).unwrap();
        resource.load_blocking().unwrap();
        assert_eq!(resource.state(), ResourceState::Content);
        assert_eq!(resource.content().len(), 2);
    }

    #[test]
    fn test_inline_content_compile_log() {
        let driver = HeadlessDriver::new();
        let mut resource = Resource::from_content(
            driver.clone(),
            [Stage::vertex(VERTEX), Stage::fragment("void main() {}")],
        )
        .unwrap();
        assert!(matches!(resource.source(), Some(Source::InlineContent(_))));

        resource.compile().unwrap();
        assert_eq!(resource.state(), ResourceState::Compiled);
        let report = resource.get_log().unwrap();
        assert_eq!(report.stages().len(), 2);
        assert!(report.stages()[0].success);
        assert!(report.stages()[0].log.is_empty());
        assert!(!report.stages()[1].success);
        assert_eq!(
            report.stages()[1].log,
            "0:1: error: expected #version directive"
        );
        // Inspecting the log does not move the resource along
        assert_eq!(resource.state(), ResourceState::Compiled);

        let program = resource.link().unwrap();
        assert_eq!(driver.is_linked(program), Some(false));
        assert_invalid(resource.get_log(), ResourceState::Linked);
    }

    #[test]
    fn test_inline_content_overrides_paths() {
        let mut resource = Resource::from_paths(
            HeadlessDriver::new(),
            [Stage::compute("never_read.glsl")],
        )
        .unwrap();
        resource
            .set_inline_content([Stage::compute(String::from("#version 430"))])
            .unwrap();
        assert_eq!(resource.state(), ResourceState::Content);
        assert_eq!(resource.source().unwrap().kinds(), vec![ShaderKind::Compute]);
    }

    #[test]
    fn test_driver_error_during_compile_releases_stages() {
        let driver = OutOfMemoryOnUpload::default();
        driver.fail.store(true, Ordering::SeqCst);
        let mut resource = Resource::from_content(
            driver.clone(),
            [
                Stage::vertex(VERTEX),
                Stage::fragment("#version 330 core\n// OOM"),
            ],
        )
        .unwrap();

        assert!(matches!(
            resource.compile(),
            Err(LoaderError::Driver(GlintError::Driver(
                DriverErrorCode::OutOfMemory
            )))
        ));
        assert_eq!(resource.state(), ResourceState::Content);
        assert_eq!(resource.content().len(), 2);
        assert_eq!(driver.inner.live_objects(), 0);
        assert_eq!(driver.pop_error(), None);

        driver.fail.store(false, Ordering::SeqCst);
        resource.compile().unwrap();
        assert_eq!(resource.state(), ResourceState::Compiled);
        assert!(resource.get_log().unwrap().is_success());
        assert_eq!(driver.inner.live_objects(), 2);
    }

    #[test]
    fn test_invalid_transitions() {
        let driver = HeadlessDriver::new();
        let mut resource = Resource::new(driver.clone());
        assert_eq!(resource.state(), ResourceState::Empty);
        assert_invalid(resource.load_blocking(), ResourceState::Empty);
        assert_invalid(resource.compile(), ResourceState::Empty);
        assert_invalid(resource.link(), ResourceState::Empty);
        assert_invalid(resource.get_log(), ResourceState::Empty);

        resource.set_source_paths([Stage::vertex("v.glsl")]).unwrap();
        assert_invalid(
            resource.set_source_paths([Stage::vertex("other.glsl")]),
            ResourceState::FoundPath,
        );
        assert_invalid(resource.compile(), ResourceState::FoundPath);

        resource.set_inline_content([Stage::vertex(VERTEX)]).unwrap();
        assert_invalid(resource.load_blocking(), ResourceState::Content);
        assert_invalid(resource.link(), ResourceState::Content);
        assert_invalid(
            resource.set_inline_content([Stage::vertex(VERTEX)]),
            ResourceState::Content,
        );

        resource.compile().unwrap();
        assert_invalid(resource.compile(), ResourceState::Compiled);
        resource.link().unwrap();
        assert_invalid(resource.link(), ResourceState::Linked);
        assert_invalid(resource.compile(), ResourceState::Linked);

        resource.destroy().unwrap();
        resource.destroy().unwrap();
        assert_eq!(resource.state(), ResourceState::Destroyed);
        assert_eq!(resource.driver_handle(), None);
        assert!(resource.content().is_empty());
        assert_invalid(resource.compile(), ResourceState::Destroyed);
        assert_invalid(
            resource.set_source_paths([Stage::vertex("v.glsl")]),
            ResourceState::Destroyed,
        );
        assert_eq!(driver.live_objects(), 0);
        assert_eq!(driver.pop_error(), None);
    }

    #[test]
    fn test_empty_sources_are_rejected() {
        let mut resource = Resource::new(HeadlessDriver::new());
        assert!(matches!(
            resource.set_source_paths(Vec::<Stage<PathBuf>>::new()),
            Err(LoaderError::EmptySource)
        ));
        assert!(matches!(
            resource.set_inline_content(Vec::<Stage<Bytes>>::new()),
            Err(LoaderError::EmptySource)
        ));
        assert_eq!(resource.state(), ResourceState::Empty);
    }

    #[test]
    fn test_async_load_needs_runtime() {
        let mut resource =
            Resource::from_paths(HeadlessDriver::new(), [Stage::vertex("v.glsl")]).unwrap();
        assert!(matches!(
            resource.load(LoadMode::Async),
            Err(LoaderError::NoRuntime)
        ));
        assert_eq!(resource.state(), ResourceState::FoundPath);
        assert!(!resource.is_busy());
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let dir = tempfile::tempdir().unwrap();
        let driver = HeadlessDriver::new();
        let mut sync = Resource::from_paths(driver.clone(), shader_files(&dir)).unwrap();
        let mut background = Resource::from_paths(driver.clone(), shader_files(&dir)).unwrap();

        sync.load(LoadMode::Sync).unwrap().wait().await.unwrap();
        background.load(LoadMode::Async).unwrap().wait().await.unwrap();
        assert_eq!(background.state(), ResourceState::Content);
        assert_eq!(sync.content(), background.content());
        assert_eq!(background.content()[0].data, Bytes::from_static(VERTEX.as_bytes()));
    }

    #[tokio::test]
    async fn test_second_load_is_busy() {
        let dir = tempfile::tempdir().unwrap();
        let mut resource =
            Resource::from_paths(HeadlessDriver::new(), shader_files(&dir)).unwrap();

        let handle = resource.load_async().unwrap();
        assert!(resource.is_busy());
        assert!(matches!(resource.load_async(), Err(LoaderError::ResourceBusy)));
        assert!(matches!(resource.load_blocking(), Err(LoaderError::ResourceBusy)));
        assert!(matches!(
            resource.set_inline_content([Stage::vertex(VERTEX)]),
            Err(LoaderError::ResourceBusy)
        ));

        handle.join().await.unwrap();
        assert!(!resource.is_busy());
        assert_eq!(resource.state(), ResourceState::Content);
    }

    #[tokio::test]
    async fn test_destroy_during_load_is_busy() {
        let dir = tempfile::tempdir().unwrap();
        let driver = HeadlessDriver::new();
        let mut resource = Resource::from_paths(driver.clone(), shader_files(&dir)).unwrap();

        let handle = resource.load_async().unwrap();
        assert!(matches!(resource.destroy(), Err(LoaderError::ResourceBusy)));
        assert_eq!(resource.state(), ResourceState::FoundPath);

        handle.join().await.unwrap();
        resource.destroy().unwrap();
        assert_eq!(resource.state(), ResourceState::Destroyed);
        assert_invalid(resource.compile(), ResourceState::Destroyed);
    }

    #[tokio::test]
    async fn test_cancel_keeps_found_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut resource =
            Resource::from_paths(HeadlessDriver::new(), shader_files(&dir)).unwrap();

        let handle = resource.load_async().unwrap();
        assert!(!handle.is_finished());
        assert!(handle.cancel().await.unwrap());
        assert!(!resource.is_busy());
        assert_eq!(resource.state(), ResourceState::FoundPath);
        assert!(resource.content().is_empty());

        // The resource can load again, or be destroyed
        resource.load_async().unwrap().join().await.unwrap();
        assert_eq!(resource.state(), ResourceState::Content);
        resource.destroy().unwrap();
    }

    #[tokio::test]
    async fn test_cancel_after_commit() {
        let dir = tempfile::tempdir().unwrap();
        let mut resource =
            Resource::from_paths(HeadlessDriver::new(), shader_files(&dir)).unwrap();

        let handle = resource.load_async().unwrap();
        while resource.is_busy() {
            tokio::task::yield_now().await;
        }
        assert!(!handle.cancel().await.unwrap());
        assert_eq!(resource.state(), ResourceState::Content);
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels() {
        let dir = tempfile::tempdir().unwrap();
        let mut resource =
            Resource::from_paths(HeadlessDriver::new(), shader_files(&dir)).unwrap();

        drop(resource.load_async().unwrap());
        while resource.is_busy() {
            tokio::task::yield_now().await;
        }
        assert_eq!(resource.state(), ResourceState::FoundPath);
        assert!(resource.content().is_empty());
    }

    #[tokio::test]
    async fn test_failed_async_load_can_retry() {
        let dir = tempfile::tempdir().unwrap();
        let vertex = write_shader(&dir, "v.glsl", VERTEX);
        let missing = dir.path().join("missing.glsl");
        let mut resource =
            Resource::from_paths(HeadlessDriver::new(), ShaderPaths::new(vertex, &missing)).unwrap();

        let err = resource.load_async().unwrap().join().await.unwrap_err();
        assert!(matches!(err, LoaderError::Io { path, .. } if path == missing));
        assert!(!resource.is_busy());
        assert_eq!(resource.state(), ResourceState::FoundPath);

        std::fs::write(&missing, FRAGMENT).unwrap();
        resource.full_load(LoadMode::Async).await.unwrap();
        assert_eq!(resource.state(), ResourceState::Linked);
    }

    #[cfg(feature = "raii")]
    #[tokio::test]
    async fn test_drop_mid_load() {
        let dir = tempfile::tempdir().unwrap();
        let driver = HeadlessDriver::new();
        let mut resource = Resource::from_paths(driver.clone(), shader_files(&dir)).unwrap();

        let handle = resource.load_async().unwrap();
        drop(resource);
        handle.join().await.unwrap();
        assert_eq!(driver.live_objects(), 0);
    }

    #[cfg(feature = "raii")]
    #[test]
    fn test_drop_releases_objects() {
        let driver = HeadlessDriver::new();
        {
            let mut compiled =
                Resource::from_content(driver.clone(), [Stage::vertex(VERTEX)]).unwrap();
            compiled.compile().unwrap();
            let mut linked =
                Resource::from_content(driver.clone(), [Stage::vertex(VERTEX)]).unwrap();
            linked.full_load_blocking().unwrap();
            assert_eq!(driver.live_objects(), 2);
        }
        assert_eq!(driver.live_objects(), 0);
        assert_eq!(driver.pop_error(), None);
    }
}
