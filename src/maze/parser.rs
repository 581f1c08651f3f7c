//! Maze text-format parsing
//!
//! The format is a header line `<width> <height>` followed by `height` rows
//! of exactly `width` tile characters. A row of the wrong width aborts
//! construction; no partial maze is ever produced.

use std::io::BufRead;

use crate::error::{Error, Result};

use super::{position::Position, state::State, tile::Tile};

#[derive(Debug)]
pub(super) struct ParsedMaze {
    pub width: i32,
    pub height: i32,
    pub states: Vec<State>,
}

fn parse_header(line: &str) -> Result<(i32, i32)> {
    let mut parts = line.split_whitespace();
    let (Some(width), Some(height)) = (parts.next(), parts.next()) else {
        return Err(Error::MissingDimensions {
            line: line.to_string(),
        });
    };
    let width: i32 = width.parse().map_err(|_| Error::MissingDimensions {
        line: line.to_string(),
    })?;
    let height: i32 = height.parse().map_err(|_| Error::MissingDimensions {
        line: line.to_string(),
    })?;
    if width <= 0 || height <= 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok((width, height))
}

pub(super) fn parse<R: BufRead>(reader: R) -> Result<ParsedMaze> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(Error::MissingDimensions {
                line: String::new(),
            });
        }
    };
    let (width, height) = parse_header(&header)?;

    let mut states = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        let row = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(Error::RowWidth {
                    row: y as usize,
                    expected: width as usize,
                    got: 0,
                });
            }
        };
        let row = row.trim_end_matches(['\r', '\n']);
        let tiles: Vec<char> = row.chars().collect();
        if tiles.len() != width as usize {
            return Err(Error::RowWidth {
                row: y as usize,
                expected: width as usize,
                got: tiles.len(),
            });
        }
        for (x, character) in tiles.into_iter().enumerate() {
            let x = x as i32;
            let tile = Tile::from_char(character, x, y)?;
            states.push(State::new(Position::new(x, y), tile));
        }
    }

    Ok(ParsedMaze {
        width,
        height,
        states,
    })
}
