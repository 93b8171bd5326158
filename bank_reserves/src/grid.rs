//! Toroidal multi-occupancy grid.
//!
//! Each cell holds any number of agent ids. The grid also records every
//! agent's cell so that cell membership and agent position cannot drift
//! apart: [`SpatialGrid::place`] and [`SpatialGrid::move_by`] are the only
//! ways to change either.

/// Grid coordinates `(x, y)`, always within `0..width` × `0..height`.
pub type Position = (usize, usize);

/// Offsets of the eight Moore-neighbourhood cells.
pub const MOORE_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Clone, Debug)]
pub struct SpatialGrid {
    width: usize,
    height: usize,
    cells: Vec<Vec<usize>>,
    positions: Vec<Option<Position>>,
}

impl SpatialGrid {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        SpatialGrid {
            width,
            height,
            cells: vec![Vec::new(); width * height],
            positions: Vec::new(),
        }
    }

    /// Wrap arbitrary integer coordinates onto the torus.
    pub fn wrap(&self, x: i64, y: i64) -> Position {
        (
            x.rem_euclid(self.width as i64) as usize,
            y.rem_euclid(self.height as i64) as usize,
        )
    }

    fn index(&self, (x, y): Position) -> usize {
        (y % self.height) * self.width + x % self.width
    }

    /// Insert `agent` at `(x mod W, y mod H)`. An agent already on the grid
    /// is relocated instead of duplicated.
    pub fn place(&mut self, agent: usize, x: i64, y: i64) -> Position {
        let pos = self.wrap(x, y);
        if agent >= self.positions.len() {
            self.positions.resize(agent + 1, None);
        }
        if let Some(old) = self.positions[agent] {
            self.detach(agent, old);
        }
        let idx = self.index(pos);
        self.cells[idx].push(agent);
        self.positions[agent] = Some(pos);
        pos
    }

    /// Relocate `agent` by `(dx, dy)` with wraparound. Returns the new cell,
    /// or `None` if the agent was never placed.
    pub fn move_by(&mut self, agent: usize, dx: i64, dy: i64) -> Option<Position> {
        let (x, y) = self.position_of(agent)?;
        Some(self.place(agent, x as i64 + dx, y as i64 + dy))
    }

    fn detach(&mut self, agent: usize, pos: Position) {
        let idx = self.index(pos);
        self.cells[idx].retain(|&a| a != agent);
    }

    pub fn position_of(&self, agent: usize) -> Option<Position> {
        self.positions.get(agent).copied().flatten()
    }

    /// All agents in the cell, in arrival order. Coordinates past the edge
    /// wrap like [`Self::place`].
    pub fn cell_contents(&self, pos: Position) -> &[usize] {
        &self.cells[self.index(pos)]
    }

    /// Agents sharing the cell at `pos`, excluding `caller`.
    pub fn neighbors_at(&self, pos: Position, caller: usize) -> Vec<usize> {
        self.cell_contents(pos)
            .iter()
            .copied()
            .filter(|&a| a != caller)
            .collect()
    }

    pub fn agent_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_wraps_coordinates() {
        let mut grid = SpatialGrid::new(20, 10);
        assert_eq!(grid.place(0, 21, -1), (1, 9));
        assert_eq!(grid.position_of(0), Some((1, 9)));
        assert_eq!(grid.cell_contents((1, 9)), &[0]);
    }

    #[test]
    fn move_wraps_around_the_torus() {
        let mut grid = SpatialGrid::new(5, 5);
        grid.place(3, 4, 0);
        assert_eq!(grid.move_by(3, 1, -1), Some((0, 4)));
        assert!(grid.cell_contents((4, 0)).is_empty());
        assert_eq!(grid.cell_contents((0, 4)), &[3]);
    }

    #[test]
    fn move_of_unplaced_agent_is_none() {
        let mut grid = SpatialGrid::new(5, 5);
        assert_eq!(grid.move_by(7, 1, 1), None);
    }

    #[test]
    fn neighbors_exclude_the_caller() {
        let mut grid = SpatialGrid::new(4, 4);
        grid.place(0, 2, 2);
        grid.place(1, 2, 2);
        grid.place(2, 2, 2);
        grid.place(3, 1, 2);
        assert_eq!(grid.neighbors_at((2, 2), 1), vec![0, 2]);
        assert!(grid.neighbors_at((1, 2), 3).is_empty());
    }

    #[test]
    fn lookups_past_the_edge_wrap() {
        let mut grid = SpatialGrid::new(20, 20);
        grid.place(0, 0, 0);
        grid.place(1, 0, 0);
        grid.place(2, 0, 1);
        assert_eq!(grid.neighbors_at((0, 20), 2), vec![0, 1]);
        assert_eq!(grid.neighbors_at((20, 0), 2), vec![0, 1]);
        assert_eq!(grid.cell_contents((40, 21)), &[2]);
    }

    #[test]
    fn replacing_keeps_a_single_membership() {
        let mut grid = SpatialGrid::new(3, 3);
        grid.place(0, 0, 0);
        grid.place(0, 1, 1);
        assert_eq!(grid.agent_count(), 1);
        assert!(grid.cell_contents((0, 0)).is_empty());
    }
}
