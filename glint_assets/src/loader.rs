//! Helpers driving several resources at once.

use std::path::PathBuf;

use futures::future::join_all;
use glint::{Driver, Handle};
use tracing::debug;

use crate::LoaderError;
use crate::resource::Resource;
use crate::source::Stage;
use crate::state::ResourceState;
use crate::task::LoadHandle;

/// One resource per set of paths, each ready to load
pub fn resources_from_paths<D, I, S, P>(
    driver: &D,
    sets: I,
) -> Result<Vec<Resource<D>>, LoaderError>
where
    D: Driver + Clone,
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Stage<P>>,
    P: Into<PathBuf>,
{
    sets.into_iter()
        .map(|paths| Resource::from_paths(driver.clone(), paths))
        .collect()
}

/// Load resources one after the other, stopping at the first failure
pub fn load_multiple_blocking<D: Driver>(resources: &mut [Resource<D>]) -> Result<(), LoaderError> {
    for resource in resources.iter_mut() {
        resource.load_blocking()?;
    }
    Ok(())
}

/// Load every resource concurrently and wait for all of them
///
/// Returns the first failure in resource order. If a load cannot even be started, the loads
/// already running are cancelled and waited for before returning.
pub async fn load_multiple<D: Driver>(resources: &mut [Resource<D>]) -> Result<(), LoaderError> {
    let mut handles = Vec::with_capacity(resources.len());
    for resource in resources.iter_mut() {
        match resource.load_async() {
            Ok(handle) => handles.push(handle),
            Err(err) => {
                debug!(started = handles.len(), "Aborting batch load");
                join_all(handles.into_iter().map(LoadHandle::cancel)).await;
                return Err(err);
            }
        }
    }
    join_all(handles.into_iter().map(LoadHandle::join))
        .await
        .into_iter()
        .collect()
}

/// Compile (when needed) and link every resource
pub fn link_multiple<D: Driver>(resources: &mut [Resource<D>]) -> Result<Vec<Handle>, LoaderError> {
    resources
        .iter_mut()
        .map(|resource| {
            if resource.state() == ResourceState::Content {
                resource.compile()?;
            }
            resource.link()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ShaderPaths;
    use crate::testing::{VERTEX, write_shader};
    use glint::HeadlessDriver;

    fn two_programs(dir: &tempfile::TempDir) -> Vec<ShaderPaths> {
        let vertex = write_shader(dir, "v.glsl", VERTEX);
        vec![
            ShaderPaths::new(&vertex, write_shader(dir, "a.glsl", "#version 330 core\n// a")),
            ShaderPaths::new(&vertex, write_shader(dir, "b.glsl", "#version 330 core\n// b")),
        ]
    }

    #[test]
    fn test_resources_from_paths() {
        let dir = tempfile::tempdir().unwrap();
        let driver = HeadlessDriver::new();
        let resources = resources_from_paths(&driver, two_programs(&dir)).unwrap();
        assert_eq!(resources.len(), 2);
        assert!(resources
            .iter()
            .all(|resource| resource.state() == ResourceState::FoundPath));
    }

    #[test]
    fn test_blocking_batch() {
        let dir = tempfile::tempdir().unwrap();
        let driver = HeadlessDriver::new();
        let mut resources = resources_from_paths(&driver, two_programs(&dir)).unwrap();
        load_multiple_blocking(&mut resources).unwrap();

        let programs = link_multiple(&mut resources).unwrap();
        assert_eq!(programs.len(), 2);
        for program in programs {
            assert_eq!(driver.is_linked(program), Some(true));
        }
        // Only the programs remain once the stages are linked
        assert_eq!(driver.live_objects(), 2);
    }

    #[test]
    fn test_blocking_batch_stops_at_failure() {
        let dir = tempfile::tempdir().unwrap();
        let driver = HeadlessDriver::new();
        let mut sets = two_programs(&dir);
        sets[0].fragment = dir.path().join("missing.glsl");
        let mut resources = resources_from_paths(&driver, sets).unwrap();

        let err = load_multiple_blocking(&mut resources).unwrap_err();
        assert!(matches!(err, LoaderError::Io { path, .. } if path.ends_with("missing.glsl")));
        assert_eq!(resources[0].state(), ResourceState::FoundPath);
        assert_eq!(resources[1].state(), ResourceState::FoundPath);
    }

    #[tokio::test]
    async fn test_parallel_batch() {
        let dir = tempfile::tempdir().unwrap();
        let driver = HeadlessDriver::new();
        let mut resources = resources_from_paths(&driver, two_programs(&dir)).unwrap();
        load_multiple(&mut resources).await.unwrap();

        for resource in &resources {
            assert_eq!(resource.state(), ResourceState::Content);
            assert!(!resource.is_busy());
        }
        assert_eq!(
            resources[1].content()[1].data,
            bytes::Bytes::from_static(b"#version 330 core\n// b")
        );
    }

    #[tokio::test]
    async fn test_parallel_batch_cancels_on_start_failure() {
        let dir = tempfile::tempdir().unwrap();
        let driver = HeadlessDriver::new();
        let mut resources = resources_from_paths(&driver, two_programs(&dir)).unwrap();
        resources.push(Resource::new(driver.clone()));

        let err = load_multiple(&mut resources).await.unwrap_err();
        assert!(matches!(
            err,
            LoaderError::InvalidState {
                operation: "load",
                state: ResourceState::Empty
            }
        ));
        for resource in &resources[..2] {
            assert!(!resource.is_busy());
            assert_eq!(resource.state(), ResourceState::FoundPath);
            assert!(resource.content().is_empty());
        }
    }
}
