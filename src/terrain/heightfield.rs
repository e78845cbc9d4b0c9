// Procedural heightfield terrain
//
// Deterministic per seed; mainly used by demos and soak tests where a flat
// plane would hide height-dependent placement bugs.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

use super::query::TerrainQuery;

pub struct NoiseTerrain {
    noise: FastNoiseLite,
    /// Peak-to-valley amplitude of the heightfield
    amplitude: f32,
    /// Height of the zero-noise plane
    base_height: f32,
}

impl NoiseTerrain {
    pub fn new(seed: i32, amplitude: f32, base_height: f32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_fractal_type(Some(FractalType::FBm));
        noise.set_fractal_octaves(Some(4));
        noise.set_fractal_lacunarity(Some(2.0));
        noise.set_fractal_gain(Some(0.5));
        noise.set_frequency(Some(0.005));

        Self {
            noise,
            amplitude,
            base_height,
        }
    }

    fn height_at(&self, x: f32, z: f32) -> f32 {
        // get_noise_2d returns [-1, 1]
        self.base_height + self.noise.get_noise_2d(x, z) * self.amplitude * 0.5
    }
}

impl TerrainQuery for NoiseTerrain {
    fn surface_height_below(&self, x: f32, z: f32, probe_y: f32) -> f32 {
        self.height_at(x, z).min(probe_y)
    }
}
