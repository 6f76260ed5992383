//! Paylines and win calculation

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::grid::{GRID_COLS, GRID_SIZE, Grid};
use crate::symbols::Symbol;

/// Shortest run that pays
pub const MIN_MATCH_LENGTH: usize = 3;

/// Cells per payline
pub const LINE_LENGTH: usize = GRID_COLS;

/// Payline category. Declaration order is evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaylineKind {
    Horizontal,
    Vertical,
    Diagonal,
    Pattern,
}

/// A payline definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Category
    pub kind: PaylineKind,
    /// Index within its category (0-based)
    pub index: usize,
    /// Grid cells checked left to right
    pub cells: Vec<usize>,
}

impl Payline {
    pub fn new(kind: PaylineKind, index: usize, cells: Vec<usize>) -> Self {
        Self { kind, index, cells }
    }

    /// Full row, left to right
    pub fn row(index: usize) -> Self {
        let start = index * GRID_COLS;
        Self::new(PaylineKind::Horizontal, index, (start..start + GRID_COLS).collect())
    }

    /// Full column, top to bottom
    pub fn column(index: usize) -> Self {
        Self::new(
            PaylineKind::Vertical,
            index,
            (0..LINE_LENGTH).map(|row| row * GRID_COLS + index).collect(),
        )
    }

    /// Identifier used in wins
    pub fn id(&self) -> PaylineId {
        PaylineId {
            kind: self.kind,
            index: self.index,
        }
    }
}

/// Category + index of a payline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaylineId {
    pub kind: PaylineKind,
    pub index: usize,
}

/// Extra shapes checked after rows, columns and diagonals.
///
/// The first, second and fourth entries repeat the two diagonals and the
/// centre row, so those lines are evaluated (and paid) twice.
const PATTERN_LINES: [[usize; LINE_LENGTH]; 8] = [
    [0, 6, 12, 18, 24],   // main diagonal
    [4, 8, 12, 16, 20],   // anti-diagonal
    [2, 6, 12, 18, 22],   // centre cross vertical
    [10, 11, 12, 13, 14], // centre cross horizontal
    [0, 1, 4, 20, 24],    // corners + edges
    [0, 4, 12, 20, 24],   // four corners + centre
    [0, 6, 12, 8, 4],     // V top
    [20, 16, 12, 18, 24], // V bottom
];

const DIAGONAL_LINES: [[usize; LINE_LENGTH]; 2] = [[0, 6, 12, 18, 24], [4, 8, 12, 16, 20]];

/// Ordered payline set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Payline>", into = "Vec<Payline>")]
pub struct PaylineSet {
    lines: Vec<Payline>,
}

impl PaylineSet {
    /// Validate and order lines by category (stable within a category)
    pub fn new(mut lines: Vec<Payline>) -> SlotResult<Self> {
        for (i, line) in lines.iter().enumerate() {
            if line.cells.len() != LINE_LENGTH {
                return Err(SlotError::InvalidPaylineLength {
                    index: i,
                    expected: LINE_LENGTH,
                    got: line.cells.len(),
                });
            }
            if let Some(&cell) = line.cells.iter().find(|&&c| c >= GRID_SIZE) {
                return Err(SlotError::PaylineOutOfBounds {
                    index: i,
                    cell,
                    size: GRID_SIZE,
                });
            }
        }
        lines.sort_by_key(|l| l.kind);
        Ok(Self { lines })
    }

    /// The live 20-line set: 5 rows, 5 columns, 2 diagonals, 8 patterns
    pub fn standard() -> Self {
        let mut lines = Self::reduced().lines;
        lines.extend(
            PATTERN_LINES
                .iter()
                .enumerate()
                .map(|(i, cells)| Payline::new(PaylineKind::Pattern, i, cells.to_vec())),
        );
        Self { lines }
    }

    /// Rows, columns and both diagonals only (12 lines)
    pub fn reduced() -> Self {
        let mut lines = Vec::with_capacity(12);
        lines.extend((0..LINE_LENGTH).map(Payline::row));
        lines.extend((0..LINE_LENGTH).map(Payline::column));
        lines.extend(
            DIAGONAL_LINES
                .iter()
                .enumerate()
                .map(|(i, cells)| Payline::new(PaylineKind::Diagonal, i, cells.to_vec())),
        );
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Payline> {
        self.lines.iter()
    }

    /// Lines of one category
    pub fn of_kind(&self, kind: PaylineKind) -> impl Iterator<Item = &Payline> {
        self.lines.iter().filter(move |l| l.kind == kind)
    }

    /// Analyze every line of a grid
    pub fn evaluate(&self, grid: &Grid, min_length: usize) -> LineAnalysis {
        let mut analysis = LineAnalysis::default();
        for payline in &self.lines {
            let wins = scan_line(grid, payline, min_length);
            if !wins.is_empty() {
                analysis.active_paylines.push(payline.clone());
                analysis.wins.extend(wins);
            }
        }
        analysis
    }
}

impl Default for PaylineSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<Payline>> for PaylineSet {
    type Error = SlotError;

    fn try_from(lines: Vec<Payline>) -> SlotResult<Self> {
        Self::new(lines)
    }
}

impl From<PaylineSet> for Vec<Payline> {
    fn from(set: PaylineSet) -> Self {
        set.lines
    }
}

/// A winning run on a single payline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWin {
    /// Payline that produced the run
    pub line: PaylineId,
    /// Matching symbol
    pub symbol: Symbol,
    /// Grid cells of the run, in payline order
    pub positions: Vec<usize>,
    /// Run length (3..=5)
    pub length: usize,
    /// Damage before the combo multiplier
    pub damage: u32,
}

/// Wins and active paylines from one analysis pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineAnalysis {
    pub wins: Vec<LineWin>,
    pub active_paylines: Vec<Payline>,
}

impl LineAnalysis {
    pub fn has_win(&self) -> bool {
        !self.wins.is_empty()
    }

    /// Sum of raw win damage, saturating at `u32::MAX`
    pub fn base_damage(&self) -> u32 {
        self.wins.iter().fold(0u32, |acc, w| acc.saturating_add(w.damage))
    }
}

/// Damage scale for a run length
pub fn length_multiplier(length: usize) -> f64 {
    match length {
        3 => 1.0,
        4 => 1.5,
        5 => 2.0,
        _ => 1.0,
    }
}

/// Damage for a run of `length` symbols
pub fn match_damage(symbol: &Symbol, length: usize) -> u32 {
    (symbol.damage as f64 * length_multiplier(length)).floor() as u32
}

/// Scan a payline left to right and emit every run of at least `min_length`.
///
/// Every run is closed on a mismatch and once more at the end of the line,
/// so a line can report more than one win.
pub fn scan_line(grid: &Grid, payline: &Payline, min_length: usize) -> Vec<LineWin> {
    let mut wins = Vec::new();
    let mut cells = payline.cells.iter().copied();

    let Some(first) = cells.next() else {
        return wins;
    };
    let mut run_symbol = &grid[first];
    let mut run_positions = vec![first];

    for cell in cells {
        let symbol = &grid[cell];
        if symbol.name == run_symbol.name {
            run_positions.push(cell);
            continue;
        }
        close_run(payline, run_symbol, &mut run_positions, min_length, &mut wins);
        run_symbol = symbol;
        run_positions.push(cell);
    }
    close_run(payline, run_symbol, &mut run_positions, min_length, &mut wins);

    wins
}

fn close_run(
    payline: &Payline,
    symbol: &Symbol,
    positions: &mut Vec<usize>,
    min_length: usize,
    wins: &mut Vec<LineWin>,
) {
    let length = positions.len();
    if length >= min_length {
        wins.push(LineWin {
            line: payline.id(),
            symbol: symbol.clone(),
            positions: positions.clone(),
            length,
            damage: match_damage(symbol, length),
        });
    }
    positions.clear();
}
