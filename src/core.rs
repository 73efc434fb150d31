use std::borrow::Cow;
use std::fmt::{Debug, Display};
use std::ops::Add;
use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

/// Error type. This is used to indicate something wrong with either the
/// configuration or with the way the solver is being driven. Dead ends and
/// exhaustion of the search space are not errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Error(Cow<'static, str>);
impl Error {
    pub const fn new_const(s: &'static str) -> Self {
        Error(Cow::Borrowed(s))
    }

    pub fn new<S: Into<String>>(s: S) -> Self {
        Error(Cow::Owned(s.into()))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Error {}

/// A cell on the board, or (when used as an offset) a relative jump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by a relative offset. None if either coordinate would
    /// overflow, which can only be somewhere off the board anyway.
    pub fn move_by(self, dir: Position) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dir.x)?, self.y.checked_add(dir.y)?))
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl From<[i32; 2]> for Position {
    fn from(p: [i32; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

impl From<Position> for [i32; 2] {
    fn from(p: Position) -> Self {
        [p.x, p.y]
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

pub const EMPTY_BOARD: Error = Error::new_const("Board width and height must both be positive");
pub const BOARD_TOO_LARGE: Error = Error::new_const("Board has too many cells");

/// Rectangular board. Cells are numbered row-major, so the index of (x, y) is
/// y*width + x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
}

impl Board {
    pub fn new(width: i32, height: i32) -> Result<Self, Error> {
        if width <= 0 || height <= 0 {
            return Err(EMPTY_BOARD);
        }
        match width.checked_mul(height) {
            Some(_) => Ok(Self { width, height }),
            None => Err(BOARD_TOO_LARGE),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn inside(&self, p: Position) -> bool {
        0 <= p.x && p.x < self.width && 0 <= p.y && p.y < self.height
    }

    /// Panics if the position is off the board. Anything that gets here
    /// without passing inside() first is a bug in the caller.
    pub fn cell_index(&self, p: Position) -> usize {
        assert!(self.inside(p), "Position {} is outside of the {}x{} board", p, self.width, self.height);
        (p.y as usize) * (self.width as usize) + (p.x as usize)
    }

    /// Inverse of cell_index.
    pub fn position(&self, index: usize) -> Position {
        assert!(index < self.size(), "Cell index {} out of range", index);
        let w = self.width as usize;
        Position::new((index % w) as i32, (index / w) as i32)
    }

    /// All cells in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size()).map(|i| self.position(i))
    }
}

pub const NO_OFFSETS: Error = Error::new_const("A leaper needs at least one offset");
pub const ZERO_OFFSET: Error = Error::new_const("The (0, 0) offset is not a move");

/// The piece being toured: an ordered list of relative jumps. The order is
/// significant only as the tie-break order when ranking moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaper {
    offsets: Vec<Position>,
}

impl Leaper {
    pub fn new(offsets: Vec<Position>) -> Result<Self, Error> {
        if offsets.is_empty() {
            return Err(NO_OFFSETS);
        }
        for (i, o) in offsets.iter().enumerate() {
            if *o == Position::new(0, 0) {
                return Err(ZERO_OFFSET);
            }
            if offsets[..i].contains(o) {
                return Err(Error::new(format!("Duplicate offset {}", o)));
            }
        }
        Ok(Self { offsets })
    }

    /// The (m, n)-leaper: every sign and axis permutation of (m, n), with
    /// duplicates (e.g., from m == n or m == 0) removed.
    pub fn symmetric(m: i32, n: i32) -> Result<Self, Error> {
        Self::new(symmetric_offsets(m, n))
    }

    pub fn offsets(&self) -> &[Position] {
        &self.offsets
    }

    /// True if some offset carries `from` to `to`.
    pub fn connects(&self, from: Position, to: Position) -> bool {
        self.offsets.iter().any(|d| from.move_by(*d) == Some(to))
    }
}

fn symmetric_offsets(m: i32, n: i32) -> Vec<Position> {
    let mut offsets = Vec::new();
    for (a, b) in [(m, n), (n, m)] {
        for sx in [1, -1] {
            for sy in [1, -1] {
                let o = Position::new(sx * a, sy * b);
                if !offsets.contains(&o) {
                    offsets.push(o);
                }
            }
        }
    }
    offsets
}

/// Named pieces. The simple ones are (m, n)-leapers; Hundred and Skewed are
/// compound sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaperPreset {
    Wazir,
    Ferz,
    Dabbaba,
    Knight,
    Alfil,
    Threeleaper,
    Camel,
    Zebra,
    Giraffe,
    // Three cells orthogonally or two diagonally (the "hundred" number grid
    // puzzle).
    Hundred,
    // Two cells orthogonally or one cell along the main diagonal only.
    Skewed,
}

impl LeaperPreset {
    pub fn offsets(self) -> Vec<Position> {
        match self {
            LeaperPreset::Wazir => symmetric_offsets(0, 1),
            LeaperPreset::Ferz => symmetric_offsets(1, 1),
            LeaperPreset::Dabbaba => symmetric_offsets(0, 2),
            LeaperPreset::Knight => symmetric_offsets(1, 2),
            LeaperPreset::Alfil => symmetric_offsets(2, 2),
            LeaperPreset::Threeleaper => symmetric_offsets(0, 3),
            LeaperPreset::Camel => symmetric_offsets(1, 3),
            LeaperPreset::Zebra => symmetric_offsets(2, 3),
            LeaperPreset::Giraffe => symmetric_offsets(1, 4),
            LeaperPreset::Hundred => vec![
                Position::new(3, 0),
                Position::new(-3, 0),
                Position::new(0, 3),
                Position::new(0, -3),
                Position::new(2, 2),
                Position::new(-2, 2),
                Position::new(2, -2),
                Position::new(-2, -2),
            ],
            LeaperPreset::Skewed => vec![
                Position::new(2, 0),
                Position::new(-2, 0),
                Position::new(0, 2),
                Position::new(0, -2),
                Position::new(1, 1),
                Position::new(-1, -1),
            ],
        }
    }

    pub fn leaper(self) -> Leaper {
        Leaper { offsets: self.offsets() }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use strum::IntoEnumIterator;
    use super::*;

    #[test]
    fn test_cell_index_is_bijection() -> Result<(), Error> {
        let board = Board::new(5, 3)?;
        let mut seen = vec![false; board.size()];
        for y in 0..3 {
            for x in 0..5 {
                let p = Position::new(x, y);
                let i = board.cell_index(p);
                assert!(!seen[i]);
                seen[i] = true;
                assert_eq!(board.position(i), p);
            }
        }
        assert!(seen.iter().all(|s| *s));
        Ok(())
    }

    #[test]
    fn test_inside() -> Result<(), Error> {
        let board = Board::new(4, 2)?;
        assert!(board.inside(Position::new(0, 0)));
        assert!(board.inside(Position::new(3, 1)));
        assert!(!board.inside(Position::new(4, 1)));
        assert!(!board.inside(Position::new(3, 2)));
        assert!(!board.inside(Position::new(-1, 0)));
        assert!(!board.inside(Position::new(0, -1)));
        Ok(())
    }

    #[test]
    #[should_panic]
    fn test_cell_index_out_of_bounds() {
        let board = Board::new(4, 4).unwrap();
        board.cell_index(Position::new(4, 4));
    }

    #[test]
    fn test_bad_boards() {
        assert_eq!(Board::new(0, 3), Err(EMPTY_BOARD));
        assert_eq!(Board::new(3, -1), Err(EMPTY_BOARD));
        assert_eq!(Board::new(i32::MAX, 2), Err(BOARD_TOO_LARGE));
    }

    #[test]
    fn test_bad_leapers() {
        assert_eq!(Leaper::new(vec![]), Err(NO_OFFSETS));
        assert_eq!(Leaper::new(vec![Position::new(0, 0)]), Err(ZERO_OFFSET));
        assert!(Leaper::new(vec![Position::new(1, 2), Position::new(1, 2)]).is_err());
    }

    #[test]
    fn test_symmetric_offsets() -> Result<(), Error> {
        assert_eq!(Leaper::symmetric(1, 2)?.offsets().len(), 8);
        assert_eq!(Leaper::symmetric(0, 1)?.offsets().len(), 4);
        assert_eq!(Leaper::symmetric(2, 2)?.offsets().len(), 4);
        assert_eq!(
            Leaper::symmetric(1, 2)?.offsets()[..3],
            [Position::new(1, 2), Position::new(1, -2), Position::new(-1, 2)],
        );
        Ok(())
    }

    #[test]
    fn test_presets() {
        for preset in LeaperPreset::iter() {
            let offsets = preset.offsets();
            // Every preset would also pass Leaper::new's checks.
            assert_eq!(Leaper::new(offsets.clone()).map(|l| l.offsets().len()), Ok(offsets.len()));
            assert_eq!(LeaperPreset::from_str(&preset.to_string()), Ok(preset));
        }
        assert_eq!(LeaperPreset::from_str("Knight"), Ok(LeaperPreset::Knight));
        assert!(LeaperPreset::from_str("bishop").is_err());
    }

    #[test]
    fn test_connects() {
        let knight = LeaperPreset::Knight.leaper();
        assert!(knight.connects(Position::new(0, 0), Position::new(1, 2)));
        assert!(knight.connects(Position::new(3, 3), Position::new(1, 2)));
        assert!(!knight.connects(Position::new(0, 0), Position::new(1, 1)));
        let skewed = LeaperPreset::Skewed.leaper();
        assert!(skewed.connects(Position::new(0, 0), Position::new(1, 1)));
        assert!(!skewed.connects(Position::new(1, 0), Position::new(0, 1)));
    }

    #[test]
    fn test_move_by_overflow() {
        let p = Position::new(2, 0);
        assert_eq!(p.move_by(Position::new(1, -1)), Some(Position::new(3, -1)));
        assert_eq!(p.move_by(Position::new(i32::MAX, 0)), None);
        assert_eq!(Position::new(0, -1).move_by(Position::new(0, i32::MIN)), None);
        let far = Leaper::new(vec![Position::new(1, 0), Position::new(i32::MAX, 0)]).unwrap();
        assert!(!far.connects(p, Position::new(i32::MIN, 0)));
        assert!(far.connects(p, Position::new(3, 0)));
    }

    #[test]
    fn test_position_serde() {
        let p = Position::new(3, -1);
        assert_eq!(serde_json::to_string(&p).unwrap(), "[3,-1]");
        assert_eq!(serde_json::from_str::<Position>("[3,-1]").unwrap(), p);
        assert_eq!(p + Position::new(-3, 1), Position::new(0, 0));
    }
}
