use std::{fs::File, io::Read, str::FromStr};
use serde_derive::{Deserialize, Serialize};
use crate::core::{Board, Error, Leaper, LeaperPreset, Position};

/// Everything needed to set up a search: the board, the piece and the cell to
/// start from. The piece is given either by preset name or by an explicit
/// list of offsets (but not both). E.g.,
///   {"width": 8, "height": 8, "start": [0, 0], "preset": "knight"}
///   {"width": 5, "height": 5, "offsets": [[2, 0], [-2, 0], [1, 1]]}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourConfig {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub start: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offsets: Option<Vec<Position>>,
}

pub const NO_LEAPER: Error = Error::new_const("Config needs either a preset or a list of offsets");
pub const TWO_LEAPERS: Error = Error::new_const("Config can't have both a preset and a list of offsets");

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            start: Position::new(0, 0),
            preset: Some(LeaperPreset::Knight.to_string()),
            offsets: None,
        }
    }
}

impl TourConfig {
    pub fn from_json(s: &str) -> Result<Self, Error> {
        serde_json::from_str(s).map_err(|e| Error::new(format!("JSON error: {}", e)))
    }

    pub fn load(path: &str) -> Result<Self, Error> {
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut contents))
            .map_err(|e| Error::new(format!("Couldn't read {}: {}", path, e)))?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| Error::new(format!("JSON error: {}", e)))
    }

    /// Handles one --name=value flag. Returns false if the flag isn't a
    /// config flag. --config replaces the whole config with the file's
    /// contents, so it should come before any other config flags.
    pub fn apply_flag(&mut self, name: &str, value: &str) -> Result<bool, Error> {
        match name {
            "--config" => *self = Self::load(value)?,
            "--width" => self.width = parse_int(name, value)?,
            "--height" => self.height = parse_int(name, value)?,
            "--start" => self.start = parse_position(value)?,
            "--preset" => {
                self.preset = Some(value.to_string());
                self.offsets = None;
            },
            "--offsets" => {
                self.offsets = Some(
                    value.split(';').map(parse_position).collect::<Result<Vec<_>, _>>()?
                );
                self.preset = None;
            },
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn leaper(&self) -> Result<Leaper, Error> {
        match (&self.preset, &self.offsets) {
            (Some(name), None) => LeaperPreset::from_str(name)
                .map(|p| p.leaper())
                .map_err(|_| Error::new(format!("Unknown preset: {}", name))),
            (None, Some(offsets)) => Leaper::new(offsets.clone()),
            (None, None) => Err(NO_LEAPER),
            (Some(_), Some(_)) => Err(TWO_LEAPERS),
        }
    }

    pub fn build(&self) -> Result<(Board, Leaper, Position), Error> {
        Ok((Board::new(self.width, self.height)?, self.leaper()?, self.start))
    }
}

fn parse_int(name: &str, value: &str) -> Result<i32, Error> {
    value.trim().parse::<i32>().map_err(|_| {
        Error::new(format!("Invalid value for {}. Must be an integer.", name))
    })
}

// "x,y"
fn parse_position(s: &str) -> Result<Position, Error> {
    match s.split_once(',') {
        Some((x, y)) => Ok(Position::new(parse_int("x", x)?, parse_int("y", y)?)),
        None => Err(Error::new(format!("Expected x,y but got {}", s))),
    }
}
