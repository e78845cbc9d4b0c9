// Terrain services consumed by the simulation core: surface-height probing
// and named collision (event) boxes. Terrain content/streaming itself is an
// external concern; only the query surface lives here.

pub mod collisions;
pub mod heightfield;
pub mod query;

pub use collisions::{CollisionContext, EventBox};
pub use heightfield::NoiseTerrain;
pub use query::{FlatTerrain, TerrainQuery};

/// Terrain bundle handed to the game context: a height query plus the
/// registry of named event boxes.
pub struct Terrain {
    query: Box<dyn TerrainQuery>,
    collisions: CollisionContext,
}

impl Terrain {
    pub fn new(query: Box<dyn TerrainQuery>) -> Self {
        Self {
            query,
            collisions: CollisionContext::new(),
        }
    }

    /// Flat terrain at height 0, the usual test fixture
    pub fn flat() -> Self {
        Self::new(Box::new(FlatTerrain::default()))
    }

    pub fn surface_height_below(&self, x: f32, z: f32, probe_y: f32) -> f32 {
        self.query.surface_height_below(x, z, probe_y)
    }

    pub fn query(&self) -> &dyn TerrainQuery {
        self.query.as_ref()
    }

    pub fn collisions(&self) -> &CollisionContext {
        &self.collisions
    }
}
