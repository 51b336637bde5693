//! Maze task: walk a grid from the start cell to the goal.

use std::fmt;
use std::str::FromStr;

use blockplay_interp::{expect_args, CallOutcome, HostError, HostFunctions};
use blockplay_types::{FunctionSig, Value};
use serde::Serialize;

use crate::error::MazeError;
use crate::task::{Task, TaskKind, TaskSnapshot};

pub const BUMPED: &str = "bumped into a wall";
pub const REACHED_GOAL: &str = "reached the goal";

pub static FUNCTIONS: &[FunctionSig] = &[
    FunctionSig::accessor("maze_is_path_forward", &[], "the cell ahead is open"),
    FunctionSig::accessor("maze_is_path_left", &[], "the cell to the left is open"),
    FunctionSig::accessor("maze_is_path_right", &[], "the cell to the right is open"),
    FunctionSig::accessor("maze_is_goal", &[], "standing on the goal"),
    FunctionSig::mutator("maze_move_forward", &[], "step one cell forward"),
    FunctionSig::mutator("maze_turn_left", &[], "turn 90 degrees left"),
    FunctionSig::mutator("maze_turn_right", &[], "turn 90 degrees right"),
];

/// Layout used when none is configured.
pub const DEFAULT_LAYOUT: &str = "\
facing: E
#########
#S..#...#
##.##.#.#
#..#..#.#
#.##.##.#
#....#.G#
#########
";

/// Compass direction the player faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Facing {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "W")]
    West,
}

impl Facing {
    pub fn left(self) -> Self {
        match self {
            Facing::North => Facing::West,
            Facing::West => Facing::South,
            Facing::South => Facing::East,
            Facing::East => Facing::North,
        }
    }

    pub fn right(self) -> Self {
        self.left().left().left()
    }

    /// `(row, col)` offset of one step.
    fn delta(self) -> (isize, isize) {
        match self {
            Facing::North => (-1, 0),
            Facing::East => (0, 1),
            Facing::South => (1, 0),
            Facing::West => (0, -1),
        }
    }
}

impl FromStr for Facing {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "N" | "n" => Ok(Facing::North),
            "E" | "e" => Ok(Facing::East),
            "S" | "s" => Ok(Facing::South),
            "W" | "w" => Ok(Facing::West),
            other => Err(MazeError::BadFacing(other.to_string())),
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Facing::North => 'N',
            Facing::East => 'E',
            Facing::South => 'S',
            Facing::West => 'W',
        };
        write!(f, "{c}")
    }
}

/// A cell position, row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

/// A parsed maze layout.
///
/// Text format: optional `facing: N|E|S|W` line, then rows of `#` (wall),
/// `.` (open), `S` (start) and `G` (goal). All rows must have the same
/// width; blank lines are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeGrid {
    walls: Vec<Vec<bool>>,
    width: usize,
    start: Cell,
    goal: Cell,
    facing: Facing,
}

impl MazeGrid {
    pub fn parse(text: &str) -> Result<Self, MazeError> {
        let mut facing = Facing::East;
        let mut walls = Vec::new();
        let mut start = None;
        let mut goal = None;
        let mut width = None;

        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = line.trim_end();
            if line.trim().is_empty() {
                continue;
            }
            if let Some(rest) = line.trim_start().strip_prefix("facing:") {
                facing = rest.parse()?;
                continue;
            }

            let row = walls.len();
            let mut cells = Vec::with_capacity(line.len());
            for (col, ch) in line.chars().enumerate() {
                let wall = match ch {
                    '#' => true,
                    '.' => false,
                    'S' => {
                        if start.replace(Cell { row, col }).is_some() {
                            return Err(MazeError::Duplicate { marker: 'S', line: line_no });
                        }
                        false
                    }
                    'G' => {
                        if goal.replace(Cell { row, col }).is_some() {
                            return Err(MazeError::Duplicate { marker: 'G', line: line_no });
                        }
                        false
                    }
                    other => {
                        return Err(MazeError::UnknownCell {
                            ch: other,
                            line: line_no,
                            col: col + 1,
                        })
                    }
                };
                cells.push(wall);
            }
            match width {
                None => width = Some(cells.len()),
                Some(w) if w != cells.len() => {
                    return Err(MazeError::Ragged {
                        line: line_no,
                        expected: w,
                        got: cells.len(),
                    })
                }
                Some(_) => {}
            }
            walls.push(cells);
        }

        let width = width.ok_or(MazeError::Empty)?;
        Ok(Self {
            walls,
            width,
            start: start.ok_or(MazeError::Missing('S'))?,
            goal: goal.ok_or(MazeError::Missing('G'))?,
            facing,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.walls.len()
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn initial_facing(&self) -> Facing {
        self.facing
    }

    /// True for cells inside the grid that are not walls.
    pub fn is_open(&self, cell: Cell) -> bool {
        self.walls
            .get(cell.row)
            .and_then(|r| r.get(cell.col))
            .is_some_and(|wall| !wall)
    }

    /// The neighbour of `cell` in direction `facing`, if it is on the grid.
    pub fn neighbour(&self, cell: Cell, facing: Facing) -> Option<Cell> {
        let (dr, dc) = facing.delta();
        let row = cell.row.checked_add_signed(dr)?;
        let col = cell.col.checked_add_signed(dc)?;
        (row < self.height() && col < self.width).then_some(Cell { row, col })
    }

    /// Render rows back to text, without the player.
    pub fn rows(&self) -> Vec<String> {
        self.walls
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(col, wall)| {
                        let cell = Cell { row, col };
                        if cell == self.start {
                            'S'
                        } else if cell == self.goal {
                            'G'
                        } else if *wall {
                            '#'
                        } else {
                            '.'
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl Default for MazeGrid {
    fn default() -> Self {
        match Self::parse(DEFAULT_LAYOUT) {
            Ok(grid) => grid,
            Err(e) => unreachable!("built-in maze layout is invalid: {e}"),
        }
    }
}

/// What the renderer needs to draw the maze task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MazeSnapshot {
    pub rows: Vec<String>,
    pub player: Cell,
    pub facing: Facing,
    pub reached_goal: bool,
}

/// The maze task and its host functions.
#[derive(Debug, Clone)]
pub struct MazeTask {
    grid: MazeGrid,
    player: Cell,
    facing: Facing,
    reached_goal: bool,
}

impl MazeTask {
    pub fn new(grid: MazeGrid) -> Self {
        Self {
            player: grid.start(),
            facing: grid.initial_facing(),
            grid,
            reached_goal: false,
        }
    }

    pub fn grid(&self) -> &MazeGrid {
        &self.grid
    }

    pub fn player(&self) -> Cell {
        self.player
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    fn is_path(&self, facing: Facing) -> bool {
        self.grid
            .neighbour(self.player, facing)
            .is_some_and(|c| self.grid.is_open(c))
    }

    fn move_forward(&mut self) -> CallOutcome {
        match self.grid.neighbour(self.player, self.facing) {
            Some(next) if self.grid.is_open(next) => {
                self.player = next;
                self.after_mutation()
            }
            _ => {
                tracing::debug!(row = self.player.row, col = self.player.col, facing = %self.facing, "bumped");
                CallOutcome::DomainViolation(BUMPED.to_string())
            }
        }
    }

    fn turn(&mut self, facing: Facing) -> CallOutcome {
        self.facing = facing;
        self.after_mutation()
    }

    /// Runs after every committed move or turn.
    fn after_mutation(&mut self) -> CallOutcome {
        if !self.reached_goal && self.player == self.grid.goal() {
            self.reached_goal = true;
            return CallOutcome::Success(REACHED_GOAL.to_string());
        }
        CallOutcome::Continue(Value::Undefined)
    }
}

impl Default for MazeTask {
    fn default() -> Self {
        Self::new(MazeGrid::default())
    }
}

impl HostFunctions for MazeTask {
    fn call(&mut self, name: &str, args: &[Value]) -> Result<CallOutcome, HostError> {
        if FUNCTIONS.iter().any(|sig| sig.name == name) {
            expect_args(name, args, 0)?;
        }
        let outcome = match name {
            "maze_is_path_forward" => CallOutcome::Continue(self.is_path(self.facing).into()),
            "maze_is_path_left" => CallOutcome::Continue(self.is_path(self.facing.left()).into()),
            "maze_is_path_right" => CallOutcome::Continue(self.is_path(self.facing.right()).into()),
            "maze_is_goal" => CallOutcome::Continue((self.player == self.grid.goal()).into()),
            "maze_move_forward" => self.move_forward(),
            "maze_turn_left" => self.turn(self.facing.left()),
            "maze_turn_right" => self.turn(self.facing.right()),
            other => return Err(HostError::UnknownFunction(other.to_string())),
        };
        Ok(outcome)
    }
}

impl Task for MazeTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Maze
    }

    fn begin_run(&mut self) {
        self.reached_goal = false;
    }

    fn reset(&mut self) {
        self.player = self.grid.start();
        self.facing = self.grid.initial_facing();
        self.reached_goal = false;
    }

    fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot::Maze(MazeSnapshot {
            rows: self.grid.rows(),
            player: self.player,
            facing: self.facing,
            reached_goal: self.reached_goal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turning_four_times_is_identity() {
        let f = Facing::North;
        assert_eq!(f.left().left().left().left(), f);
        assert_eq!(f.right(), Facing::East);
        assert_eq!(f.left(), Facing::West);
    }

    #[test]
    fn default_layout_parses() {
        let grid = MazeGrid::default();
        assert_eq!(grid.width(), 9);
        assert_eq!(grid.height(), 7);
        assert_eq!(grid.start(), Cell { row: 1, col: 1 });
        assert_eq!(grid.goal(), Cell { row: 5, col: 7 });
        assert_eq!(grid.initial_facing(), Facing::East);
    }

    #[test]
    fn rows_round_trip_through_parse() {
        let grid = MazeGrid::default();
        let text = grid.rows().join("\n");
        let again = MazeGrid::parse(&format!("facing: E\n{text}")).unwrap();
        assert_eq!(again, grid);
    }

    #[test]
    fn neighbour_stops_at_the_edge() {
        let grid = MazeGrid::parse("SG").unwrap();
        assert_eq!(grid.neighbour(Cell { row: 0, col: 0 }, Facing::North), None);
        assert_eq!(grid.neighbour(Cell { row: 0, col: 0 }, Facing::West), None);
        assert_eq!(grid.neighbour(Cell { row: 0, col: 1 }, Facing::East), None);
        assert_eq!(
            grid.neighbour(Cell { row: 0, col: 0 }, Facing::East),
            Some(Cell { row: 0, col: 1 })
        );
    }
}
