//! Startup asset loading.  Every image is loaded once and pre-scaled to the
//! size it is drawn at; any missing file aborts startup.

use std::path::Path;

use anyhow::Context;

use crate::backend::Backend;
use crate::config::AssetConfig;
use crate::consts::{
    ENEMY_HEIGHT, ENEMY_WIDTH, LASER_HEIGHT, LASER_WIDTH, MOOD_SIZE, PLAYER_HEIGHT, PLAYER_WIDTH,
};

#[derive(Clone, Debug)]
pub struct Assets<I> {
    pub player: I,
    pub enemy: I,
    pub laser: I,
    pub background: I,
    /// Shown on the game-over screen for a good score.
    pub happy: I,
    pub sad: I,
}

fn load_scaled<B: Backend>(
    backend: &mut B,
    dir: &Path,
    file: &str,
    width: f32,
    height: f32,
) -> anyhow::Result<B::Image> {
    let path = dir.join(file);
    let image = backend
        .load_image(&path)
        .with_context(|| format!("loading image {}", path.display()))?;
    Ok(backend.scale_image(&image, width, height))
}

impl<I: Clone> Assets<I> {
    pub fn load<B>(
        backend: &mut B,
        cfg: &AssetConfig,
        width: f32,
        height: f32,
    ) -> anyhow::Result<Self>
    where
        B: Backend<Image = I>,
    {
        let dir = cfg.dir.as_path();
        let assets = Assets {
            player: load_scaled(backend, dir, &cfg.player, PLAYER_WIDTH, PLAYER_HEIGHT)?,
            enemy: load_scaled(backend, dir, &cfg.enemy, ENEMY_WIDTH, ENEMY_HEIGHT)?,
            laser: load_scaled(backend, dir, &cfg.laser, LASER_WIDTH, LASER_HEIGHT)?,
            background: load_scaled(backend, dir, &cfg.background, width, height)?,
            happy: load_scaled(backend, dir, &cfg.happy, MOOD_SIZE, MOOD_SIZE)?,
            sad: load_scaled(backend, dir, &cfg.sad, MOOD_SIZE, MOOD_SIZE)?,
        };
        log::info!("loaded 6 images from {}", dir.display());
        Ok(assets)
    }
}
