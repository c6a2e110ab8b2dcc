//! Router capability and route descriptors.
//!
//! The emitter only needs two operations from whatever serves the site:
//! store a data blob, and register a route whose modules are either module
//! paths or indirect imports of another unit's content. How the router
//! resolves those imports is its own business.

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Alias under which data blobs are referenced from routes.
pub const DATA_ALIAS: &str = "~blog";

/// Router errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A data blob name was written twice in one build.
    #[error("data blob {0} was already created")]
    DuplicateData(String),

    /// A worker panicked while holding the router state.
    #[error("router state poisoned")]
    Poisoned,
}

/// Result type for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;

/// Capability consumed by the unit emitter.
pub trait Router: Sync {
    /// Store `content` as the data blob `name` and return the module path
    /// routes use to reference it.
    fn create_data(&self, name: &str, content: &str) -> Result<String>;

    /// Register a route.
    fn add_route(&self, route: RouteConfig) -> Result<()>;
}

/// An addressable unit: a path, the component rendering it and its modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteConfig {
    pub path: String,
    pub component: String,
    pub exact: bool,
    pub modules: BTreeMap<String, Module>,
}

/// A module value bound to a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Module {
    /// A module loaded directly: a post source or a data blob path.
    Path(String),
    /// Listed posts, each pulled in by reference.
    Items(Vec<ContentItem>),
}

/// One listed post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentItem {
    pub content: ContentImport,
}

/// Indirect reference to another unit's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentImport {
    /// Marks the object as an import rather than nested data.
    #[serde(rename = "__import")]
    pub import: bool,

    /// Source path of the referenced post.
    pub path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<ImportQuery>,
}

/// Query flags handed to the content loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportQuery {
    /// Render only the excerpt before the truncate marker.
    pub truncated: bool,
}

impl ContentItem {
    /// Excerpt reference to the post at `source`.
    pub fn truncated(source: impl Into<String>) -> Self {
        Self {
            content: ContentImport {
                import: true,
                path: source.into(),
                query: Some(ImportQuery { truncated: true }),
            },
        }
    }
}

impl RouteConfig {
    pub fn new(path: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            component: component.into(),
            exact: true,
            modules: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_module(mut self, name: &str, module: Module) -> Self {
        self.modules.insert(name.to_string(), module);
        self
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }
}

fn aliased(name: &str) -> String {
    format!("{DATA_ALIAS}/{name}")
}

/// Routes registered by concurrent emitters.
#[derive(Debug, Default)]
struct RouteTable {
    routes: Mutex<Vec<RouteConfig>>,
}

impl RouteTable {
    fn push(&self, route: RouteConfig) -> Result<()> {
        self.routes
            .lock()
            .map_err(|_| RouterError::Poisoned)?
            .push(route);
        Ok(())
    }

    /// Snapshot sorted by path.
    fn sorted(&self) -> Result<Vec<RouteConfig>> {
        let mut routes = self.routes.lock().map_err(|_| RouterError::Poisoned)?.clone();
        routes.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(routes)
    }
}

/// Router that keeps blobs and routes in memory.
#[derive(Debug, Default)]
pub struct MemoryRouter {
    data: Mutex<BTreeMap<String, String>>,
    routes: RouteTable,
}

impl MemoryRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored blob contents by name.
    pub fn data(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.data.lock().map_err(|_| RouterError::Poisoned)?.clone())
    }

    /// Registered routes sorted by path.
    pub fn routes(&self) -> Result<Vec<RouteConfig>> {
        self.routes.sorted()
    }

    pub fn route(&self, path: &str) -> Result<Option<RouteConfig>> {
        Ok(self.routes()?.into_iter().find(|r| r.path == path))
    }
}

impl Router for MemoryRouter {
    fn create_data(&self, name: &str, content: &str) -> Result<String> {
        let mut data = self.data.lock().map_err(|_| RouterError::Poisoned)?;
        if data.contains_key(name) {
            return Err(RouterError::DuplicateData(name.to_string()));
        }
        data.insert(name.to_string(), content.to_string());
        Ok(aliased(name))
    }

    fn add_route(&self, route: RouteConfig) -> Result<()> {
        self.routes.push(route)
    }
}

/// Router writing blobs to a directory and collecting routes for a manifest.
#[derive(Debug)]
pub struct FsRouter {
    data_dir: PathBuf,
    written: Mutex<HashSet<String>>,
    routes: RouteTable,
}

impl FsRouter {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            written: Mutex::new(HashSet::new()),
            routes: RouteTable::default(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Registered routes sorted by path.
    pub fn routes(&self) -> Result<Vec<RouteConfig>> {
        self.routes.sorted()
    }

    /// Write all registered routes as a JSON manifest.
    pub fn write_manifest(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.routes()?)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        debug!(path = %path.display(), "wrote route manifest");
        Ok(())
    }
}

impl Router for FsRouter {
    fn create_data(&self, name: &str, content: &str) -> Result<String> {
        if !self
            .written
            .lock()
            .map_err(|_| RouterError::Poisoned)?
            .insert(name.to_string())
        {
            return Err(RouterError::DuplicateData(name.to_string()));
        }

        fs::create_dir_all(&self.data_dir)?;
        let path = self.data_dir.join(name);
        fs::write(&path, content)?;

        debug!(path = %path.display(), "wrote data blob");
        Ok(aliased(name))
    }

    fn add_route(&self, route: RouteConfig) -> Result<()> {
        self.routes.push(route)
    }
}
