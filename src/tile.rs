/// The valid region of a tile, clipped at the right and bottom image edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileExtent {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Square tiles covering an image in row-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TileGrid {
    pub width: usize,
    pub height: usize,
    pub tile_size: usize,
}

impl TileGrid {
    #[inline]
    pub fn columns(&self) -> usize {
        self.width.div_ceil(self.tile_size)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.height.div_ceil(self.tile_size)
    }

    /// Clipped extent of the tile in `column` of tile row `row`.
    #[inline]
    pub fn extent(&self, column: usize, row: usize) -> TileExtent {
        let x = column * self.tile_size;
        let y = row * self.tile_size;

        TileExtent {
            x,
            y,
            width: self.tile_size.min(self.width - x),
            height: self.tile_size.min(self.height - y),
        }
    }

    /// Tiles of a single tile row, left to right.
    #[inline]
    pub fn row(&self, row: usize) -> impl Iterator<Item = TileExtent> + '_ {
        (0..self.columns()).map(move |column| self.extent(column, row))
    }

    /// All tiles, row by row.
    #[inline]
    pub fn tiles(&self) -> impl Iterator<Item = TileExtent> + '_ {
        (0..self.rows()).flat_map(move |row| self.row(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_tiles_are_clipped() {
        let grid = TileGrid {
            width: 10,
            height: 10,
            tile_size: 4,
        };

        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.rows(), 3);

        let tiles: Vec<_> = grid.tiles().collect();
        assert_eq!(tiles.len(), 9);
        assert_eq!(
            tiles[0],
            TileExtent {
                x: 0,
                y: 0,
                width: 4,
                height: 4
            }
        );
        assert_eq!(
            tiles[2],
            TileExtent {
                x: 8,
                y: 0,
                width: 2,
                height: 4
            }
        );
        assert_eq!(
            tiles[8],
            TileExtent {
                x: 8,
                y: 8,
                width: 2,
                height: 2
            }
        );
        assert_eq!(tiles.iter().map(|tile| tile.width * tile.height).sum::<usize>(), 100);
    }

    #[test]
    fn tiles_are_row_major() {
        let grid = TileGrid {
            width: 8,
            height: 8,
            tile_size: 4,
        };

        let origins: Vec<_> = grid.tiles().map(|tile| (tile.x, tile.y)).collect();
        assert_eq!(origins, vec![(0, 0), (4, 0), (0, 4), (4, 4)]);
    }
}
