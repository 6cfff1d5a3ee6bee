//! Call-local cycle detection.
//!
//! Each factory invocation pushes a [`ResolutionPath`] frame that lives on
//! the Rust stack of the resolving thread and points at its caller's frame.
//! Nothing is stored in the container, so two threads resolving overlapping
//! types never see each other's frames, and a frame disappears when its
//! factory returns, whether it succeeded or not.

use crate::error::CircularDependencyError;
use crate::key::DependencyKey;

/// One link of the chain of bindings currently under construction.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionPath<'a> {
    key: &'a DependencyKey,
    parent: Option<&'a ResolutionPath<'a>>,
}

impl<'a> ResolutionPath<'a> {
    /// Frame for `key`, built while `parent` is being constructed. `None`
    /// starts a new resolution.
    pub fn push(parent: Option<&'a ResolutionPath<'a>>, key: &'a DependencyKey) -> Self {
        Self { key, parent }
    }

    /// The binding this frame constructs.
    pub fn key(&self) -> &DependencyKey {
        self.key
    }

    pub fn depth(&self) -> usize {
        self.frames().count()
    }

    /// Whether `key` is already being constructed on this path.
    pub fn contains(&self, key: &DependencyKey) -> bool {
        self.frames().any(|frame| frame.key == key)
    }

    /// Keys from the outermost frame to this one.
    pub fn keys(&self) -> Vec<DependencyKey> {
        let mut keys: Vec<DependencyKey> = self.frames().map(|frame| *frame.key).collect();
        keys.reverse();
        keys
    }

    /// The cycle closed by entering `key` again, or `None` if `key` is not on
    /// the path.
    ///
    /// The chain starts at the earlier occurrence of `key` and ends with `key`.
    pub fn cycle_with(&self, key: &DependencyKey) -> Option<CircularDependencyError> {
        if !self.contains(key) {
            return None;
        }
        let keys = self.keys();
        let start = keys.iter().position(|k| k == key).unwrap_or(0);
        let mut chain = keys[start..].to_vec();
        chain.push(*key);
        Some(CircularDependencyError { chain })
    }

    fn frames(&self) -> impl Iterator<Item = &ResolutionPath<'a>> {
        std::iter::successors(Some(self), |frame| frame.parent)
    }
}
