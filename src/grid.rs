//! Tile grid: terrain and food.

use crate::config::WorldConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Terrain types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Land,
    Water,
}

impl Terrain {
    /// Numeric code fed to the brains
    #[inline]
    pub fn code(&self) -> f32 {
        match self {
            Terrain::Land => 0.0,
            Terrain::Water => 1.0,
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            Terrain::Land => "Land",
            Terrain::Water => "Water",
        }
    }
}

/// One grid cell
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: Terrain,
    pub food: f32,
}

impl Tile {
    pub fn land(food: f32) -> Self {
        Self {
            terrain: Terrain::Land,
            food: food.max(0.0),
        }
    }

    pub fn water() -> Self {
        Self {
            terrain: Terrain::Water,
            food: 0.0,
        }
    }
}

/// Rectangular grid of tiles, `cells[y][x]`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_size: f32,
    cells: Vec<Vec<Tile>>,
}

impl TileGrid {
    /// Generate terrain and initial food.
    ///
    /// Water follows a low-frequency sine/cosine pattern pushed around by
    /// noise, giving loosely connected lakes.
    pub fn generate<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R) -> Self {
        let cells = (0..config.height)
            .map(|y| {
                (0..config.width)
                    .map(|x| {
                        let pattern = (config.terrain_freq_x * x as f32).sin()
                            - (config.terrain_freq_y * y as f32).cos()
                            + (rng.gen::<f32>() - 1.0);

                        if pattern > config.water_threshold {
                            Tile::water()
                        } else if rng.gen::<f32>() < config.food_abundance {
                            Tile::land(config.tile_base_food)
                        } else {
                            Tile::land(0.0)
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            width: config.width,
            height: config.height,
            tile_size: config.tile_size,
            cells,
        }
    }

    /// Grid where every cell is a copy of `tile`
    pub fn filled(width: usize, height: usize, tile_size: f32, tile: Tile) -> Self {
        Self {
            width,
            height,
            tile_size,
            cells: vec![vec![tile; width]; height],
        }
    }

    /// Daily regrowth: each land tile, with probability `food_abundance`,
    /// gains a sixth of the base food. Not capped.
    pub fn regrow<R: Rng + ?Sized>(&mut self, config: &WorldConfig, rng: &mut R) {
        let amount = config.tile_base_food / 6.0;
        for tile in self.cells.iter_mut().flatten() {
            if tile.terrain == Terrain::Land && rng.gen::<f32>() < config.food_abundance {
                tile.food += amount;
            }
        }
    }

    /// Take up to `amount` food from a tile, returns the amount removed
    pub fn consume(&mut self, x: usize, y: usize, amount: f32) -> f32 {
        let tile = self.tile_mut(x, y);
        let consumed = amount.max(0.0).min(tile.food);
        tile.food -= consumed;
        consumed
    }

    /// Tile at a cell. Out-of-range coordinates are a logic error upstream.
    #[inline]
    pub fn tile(&self, x: usize, y: usize) -> &Tile {
        assert!(
            x < self.width && y < self.height,
            "tile ({}, {}) outside {}x{} grid",
            x,
            y,
            self.width,
            self.height
        );
        &self.cells[y][x]
    }

    #[inline]
    pub fn tile_mut(&mut self, x: usize, y: usize) -> &mut Tile {
        assert!(
            x < self.width && y < self.height,
            "tile ({}, {}) outside {}x{} grid",
            x,
            y,
            self.width,
            self.height
        );
        &mut self.cells[y][x]
    }

    /// Non-panicking lookup
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&Tile> {
        self.cells.get(y).and_then(|row| row.get(x))
    }

    /// Cell under a pixel position. Rounds to the nearest cell and keeps
    /// the result on the grid.
    #[inline]
    pub fn cell_of(&self, px: f32, py: f32) -> (usize, usize) {
        let cx = (px / self.tile_size).round().max(0.0) as usize;
        let cy = (py / self.tile_size).round().max(0.0) as usize;
        (cx.min(self.width - 1), cy.min(self.height - 1))
    }

    /// Tile under a pixel position
    #[inline]
    pub fn tile_at_pixel(&self, px: f32, py: f32) -> &Tile {
        let (x, y) = self.cell_of(px, py);
        self.tile(x, y)
    }

    /// Get total food in the grid
    pub fn total_food(&self) -> f32 {
        self.cells.iter().flatten().map(|t| t.food).sum()
    }

    /// Number of land tiles
    pub fn land_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|t| t.terrain == Terrain::Land)
            .count()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// World extent along x in pixels
    #[inline]
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    /// World extent along y in pixels
    #[inline]
    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }
}
