use crate::physics::{PhysicsState, Rect, Vec2, HITBOX_HEIGHT};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Distance below the lowest platform at which a falling agent is counted as dead
pub const KILL_MARGIN: f32 = 600.0;

/// Width and height of the built-in arena
pub const ARENA_WIDTH: f32 = 2000.0;
pub const ARENA_HEIGHT: f32 = 1000.0;

#[derive(Error, Debug)]
pub enum LevelError {
    #[error("failed to access level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed level file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("level contains no platforms")]
    Empty,
    #[error("platform {index} has a non-positive or non-finite size")]
    InvalidPlatform { index: usize },
}

/// Static geometry an agent runs through
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub platforms: Vec<Rect>,
    /// Top-left of the hitbox for every new agent
    pub spawn: Vec2,
    /// Agents whose hitbox top passes below this y are dead
    pub kill_plane: Option<f32>,
}

impl Default for Level {
    /// A floor spanning the arena with a wall at each end.
    fn default() -> Self {
        let floor_y = ARENA_HEIGHT + 100.0;
        let platforms = vec![
            Rect::new(0.0, floor_y, ARENA_WIDTH, 20.0),
            Rect::new(0.0, 100.0, 10.0, ARENA_HEIGHT),
            Rect::new(ARENA_WIDTH - 10.0, 100.0, 10.0, ARENA_HEIGHT),
        ];
        Self::with_platforms(platforms, Vec2::new(40.0, floor_y - HITBOX_HEIGHT))
    }
}

impl Level {
    /// Level with the kill plane placed a fixed margin under the lowest platform
    pub fn with_platforms(platforms: Vec<Rect>, spawn: Vec2) -> Self {
        let kill_plane = platforms
            .iter()
            .map(Rect::bottom)
            .max_by(f32::total_cmp)
            .map(|lowest| lowest + KILL_MARGIN);
        Self {
            platforms,
            spawn,
            kill_plane,
        }
    }

    /// One obstacle-free floor of the given length, spawn standing on its left end
    pub fn flat(length: f32) -> Self {
        let floor = Rect::new(0.0, 600.0, length, 40.0);
        Self::with_platforms(vec![floor], Vec2::new(0.0, floor.top() - HITBOX_HEIGHT))
    }

    /// Physics state every agent starts a generation in
    pub fn spawn_state(&self) -> PhysicsState {
        PhysicsState::resting(self.spawn, &self.platforms)
    }

    /// Smallest rectangle enclosing every platform
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.platforms.first()?;
        let (mut left, mut top, mut right, mut bottom) =
            (first.left(), first.top(), first.right(), first.bottom());
        for p in &self.platforms[1..] {
            left = left.min(p.left());
            top = top.min(p.top());
            right = right.max(p.right());
            bottom = bottom.max(p.bottom());
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Swap in new geometry, moving the kill plane with it
    pub fn set_platforms(&mut self, platforms: Vec<Rect>) {
        *self = Self::with_platforms(platforms, self.spawn);
    }

    pub fn load(path: &Path, spawn: Vec2) -> Result<Self, LevelError> {
        let level = Self::with_platforms(load_platforms(path)?, spawn);
        let hitbox = PhysicsState::at(spawn).hitbox();
        if let Some(index) = level.platforms.iter().position(|p| p.overlaps(&hitbox)) {
            log::warn!(
                "Spawn ({}, {}) is inside platform {} of {}",
                spawn.x,
                spawn.y,
                index,
                path.display()
            );
        }
        Ok(level)
    }

    pub fn save(&self, path: &Path) -> Result<(), LevelError> {
        save_platforms(path, &self.platforms)
    }
}

/// Read a level file: a JSON array of `{x, y, width, height}` objects.
pub fn load_platforms(path: &Path) -> Result<Vec<Rect>, LevelError> {
    let content = fs::read_to_string(path)?;
    let platforms: Vec<Rect> = serde_json::from_str(&content)?;
    validate_platforms(&platforms)?;
    Ok(platforms)
}

/// Write every platform to `path`, creating parent directories as needed.
pub fn save_platforms(path: &Path, platforms: &[Rect]) -> Result<(), LevelError> {
    validate_platforms(platforms)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(platforms)?)?;
    log::info!("Saved {} platforms to {}", platforms.len(), path.display());
    Ok(())
}

fn validate_platforms(platforms: &[Rect]) -> Result<(), LevelError> {
    if platforms.is_empty() {
        return Err(LevelError::Empty);
    }
    for (index, p) in platforms.iter().enumerate() {
        let finite = [p.x, p.y, p.width, p.height].iter().all(|v| v.is_finite());
        if !finite || p.width <= 0.0 || p.height <= 0.0 {
            return Err(LevelError::InvalidPlatform { index });
        }
    }
    Ok(())
}
