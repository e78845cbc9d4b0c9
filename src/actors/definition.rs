// Actor definitions, skins, and the content cache
//
// Parsing/IO stays behind the `DefinitionSource` seam: the content pipeline
// (resource groups, archives) is an external collaborator. This module owns
// only lookup, validation policy, and explicit eviction.

use dashmap::DashMap;
use glam::Vec3;
use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use super::actor::DriveableKind;

/// Parsed actor (rig) definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorDefinition {
    pub name: String,
    pub driveable: DriveableKind,
    pub num_nodes: usize,
    /// Bounding height of the node cloud at spawn
    pub height: f32,
    /// Horizontal collision footprint
    pub bounding_radius: f32,
    pub min_camera_radius: f32,
    /// Camera roll vector of the interior camera anchor, when one is defined
    pub cinecam_roll: Option<Vec3>,
    pub has_dashboard: bool,
    pub has_video_camera: bool,
    /// Lock slide nodes immediately after spawn
    pub slide_nodes_connect_instantly: bool,
    pub default_config: Option<String>,
    pub sections: Vec<String>,
}

impl Default for ActorDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            driveable: DriveableKind::NotDriveable,
            num_nodes: 0,
            height: 2.5,
            bounding_radius: 3.0,
            min_camera_radius: 5.0,
            cinecam_roll: None,
            has_dashboard: false,
            has_video_camera: false,
            slide_nodes_connect_instantly: false,
            default_config: None,
            sections: Vec::new(),
        }
    }
}

impl ActorDefinition {
    #[cfg(test)]
    pub(crate) fn test_truck(name: &str) -> Self {
        Self {
            name: name.to_string(),
            driveable: DriveableKind::Truck,
            num_nodes: 120,
            has_dashboard: true,
            ..Default::default()
        }
    }
}

/// Skin definition resolved through the content cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinDef {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("definition '{0}' not found")]
    NotFound(String),
    #[error("failed to read definition '{filename}': {source}")]
    Io {
        filename: String,
        source: std::io::Error,
    },
    #[error("failed to parse definition '{filename}': {source}")]
    Parse {
        filename: String,
        source: serde_json::Error,
    },
    #[error("definition '{0}' is invalid: {1}")]
    Invalid(String, String),
}

/// Where parsed definitions come from (filesystem, archives, tests)
pub trait DefinitionSource: Send + Sync {
    fn load(&self, filename: &str) -> Result<ActorDefinition, DefinitionError>;
}

/// In-memory source; the test and scripting back end
#[derive(Default)]
pub struct MemoryDefinitionSource {
    definitions: DashMap<String, ActorDefinition>,
}

impl MemoryDefinitionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, filename: impl Into<String>, def: ActorDefinition) {
        self.definitions.insert(filename.into(), def);
    }
}

impl DefinitionSource for MemoryDefinitionSource {
    fn load(&self, filename: &str) -> Result<ActorDefinition, DefinitionError> {
        self.definitions
            .get(filename)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DefinitionError::NotFound(filename.to_string()))
    }
}

/// Directory of JSON definition files (`<root>/<filename>.json`)
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DefinitionSource for JsonDirSource {
    fn load(&self, filename: &str) -> Result<ActorDefinition, DefinitionError> {
        let path = self.root.join(format!("{}.json", filename));
        let raw = std::fs::read_to_string(&path).map_err(|source| DefinitionError::Io {
            filename: filename.to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| DefinitionError::Parse {
            filename: filename.to_string(),
            source,
        })
    }
}

/// Definition + skin cache with explicit eviction
///
/// Load failures are reported here (the caller only sees `None`), matching
/// the contract that spawn failures degrade to "no actor produced".
pub struct ContentCache {
    source: Box<dyn DefinitionSource>,
    definitions: DashMap<String, Arc<ActorDefinition>>,
    skins: DashMap<String, Arc<SkinDef>>,
}

impl ContentCache {
    pub fn new(source: Box<dyn DefinitionSource>) -> Self {
        Self {
            source,
            definitions: DashMap::new(),
            skins: DashMap::new(),
        }
    }

    /// Fetch a parsed definition, loading and caching on miss
    ///
    /// `relaxed` (terrain-default spawns) accepts definitions that would
    /// fail strict validation, e.g. node-less terrain furniture.
    pub fn fetch_definition(&self, filename: &str, relaxed: bool) -> Option<Arc<ActorDefinition>> {
        if let Some(cached) = self.definitions.get(filename) {
            return Some(cached.value().clone());
        }

        let def = match self.source.load(filename) {
            Ok(def) => def,
            Err(err) => {
                error!("could not load actor definition: {}", err);
                return None;
            }
        };

        if !relaxed && def.num_nodes == 0 {
            error!("definition '{}' has no nodes, refusing to spawn", filename);
            return None;
        }

        let def = Arc::new(def);
        self.definitions.insert(filename.to_string(), def.clone());
        Some(def)
    }

    /// Drop a cached definition so the next fetch re-reads from the source
    pub fn unload_definition(&self, filename: &str) -> bool {
        self.definitions.remove(filename).is_some()
    }

    pub fn register_skin(&self, skin: SkinDef) {
        self.skins.insert(skin.name.clone(), Arc::new(skin));
    }

    /// Resolve a skin reference; unknown skins report and return None
    pub fn fetch_skin(&self, name: &str) -> Option<Arc<SkinDef>> {
        let skin = self.skins.get(name).map(|entry| entry.value().clone());
        if skin.is_none() {
            warn!("skin '{}' not found, falling back to default", name);
        }
        skin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts loads so cache hits and evictions are observable
    struct CountingSource {
        inner: MemoryDefinitionSource,
        loads: Arc<AtomicUsize>,
    }

    impl DefinitionSource for CountingSource {
        fn load(&self, filename: &str) -> Result<ActorDefinition, DefinitionError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load(filename)
        }
    }

    fn counting_cache() -> (ContentCache, Arc<AtomicUsize>) {
        let inner = MemoryDefinitionSource::new();
        inner.insert("wagon.truck", ActorDefinition::test_truck("wagon.truck"));
        let loads = Arc::new(AtomicUsize::new(0));
        let cache = ContentCache::new(Box::new(CountingSource {
            inner,
            loads: loads.clone(),
        }));
        (cache, loads)
    }

    #[test]
    fn test_fetch_caches_until_evicted() {
        let (cache, loads) = counting_cache();

        assert!(cache.fetch_definition("wagon.truck", false).is_some());
        assert!(cache.fetch_definition("wagon.truck", false).is_some());
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        assert!(cache.unload_definition("wagon.truck"));
        assert!(cache.fetch_definition("wagon.truck", false).is_some());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_definition_is_none() {
        let (cache, _) = counting_cache();
        assert!(cache.fetch_definition("ghost.truck", false).is_none());
    }

    #[test]
    fn test_nodeless_definition_needs_relaxed_validation() {
        let source = MemoryDefinitionSource::new();
        source.insert(
            "gate.fixed",
            ActorDefinition {
                name: "gate.fixed".into(),
                num_nodes: 0,
                ..Default::default()
            },
        );
        let cache = ContentCache::new(Box::new(source));

        assert!(cache.fetch_definition("gate.fixed", false).is_none());
        assert!(cache.fetch_definition("gate.fixed", true).is_some());
    }

    #[test]
    fn test_unknown_skin_is_none() {
        let (cache, _) = counting_cache();
        cache.register_skin(SkinDef {
            name: "rust_red".into(),
            description: String::new(),
        });
        assert!(cache.fetch_skin("rust_red").is_some());
        assert!(cache.fetch_skin("chrome").is_none());
    }
}
