use std::fmt;

/// Lifecycle stage of a [`crate::Resource`]
///
/// ```text
/// Empty --set_source_paths--> FoundPath --load--> Content
/// Empty | FoundPath --set_inline_content--> Content
/// Content --compile--> Compiled --link--> Linked
/// any --destroy--> Destroyed
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ResourceState {
    #[default]
    Empty,
    FoundPath,
    Content,
    Compiled,
    Linked,
    Destroyed,
}

impl ResourceState {
    pub fn name(self) -> &'static str {
        match self {
            ResourceState::Empty => "empty",
            ResourceState::FoundPath => "found path",
            ResourceState::Content => "content",
            ResourceState::Compiled => "compiled",
            ResourceState::Linked => "linked",
            ResourceState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How [`crate::Resource::load`] reads its files
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum LoadMode {
    /// Read on the calling thread
    #[default]
    Sync,
    /// Read on a tokio task
    Async,
}
