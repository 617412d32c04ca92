//! Import registry.
//!
//! Every rewritten value is a module import of a loader-chain path. The host
//! owns one registry per compiled template; two requests for the same exact
//! path string get the same handle.

use rustc_hash::FxHashMap;

/// Reference to one registered import.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportHandle {
    pub index: usize,
    pub path: String,
}

impl ImportHandle {
    /// Binding name used when imports are hoisted.
    pub fn binding(&self) -> String {
        format!("_imports_{}", self.index)
    }
}

/// The only view of the registry the engine gets: insert if absent, else reuse.
pub trait ImportSink {
    fn import(&mut self, path: &str) -> ImportHandle;
}

#[derive(Debug, Default)]
pub struct ImportRegistry {
    paths: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl ImportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Registered paths in handle order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }
}

impl ImportSink for ImportRegistry {
    fn import(&mut self, path: &str) -> ImportHandle {
        if let Some(&index) = self.index.get(path) {
            return ImportHandle {
                index,
                path: path.to_string(),
            };
        }

        let index = self.paths.len();
        self.paths.push(path.to_string());
        self.index.insert(path.to_string(), index);
        ImportHandle {
            index,
            path: path.to_string(),
        }
    }
}
