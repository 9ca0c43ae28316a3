//! Dataset loader
//!
//! Source format: UTF-8 text, one record per non-empty line, fields
//! separated by `;` with no escaping:
//! ```text
//! url;shows;category_0;category_1;...;category_n
//! ```
//! `shows` is a non-negative integer; the category list may be empty.
//! The dataset is trusted at load time, so any malformed line is a fatal
//! configuration error rather than something to skip.

use std::fs;
use std::path::{Path, PathBuf};

use nom::{
    bytes::complete::take_till1,
    character::complete::{char, u32 as dec_u32},
    combinator::all_consuming,
    multi::many0,
    sequence::preceded,
    IResult,
};

use crate::error::{Error, Result};
use crate::model::PhotoRecord;

/// A delimited photo dataset on disk.
///
/// `load()` re-reads the source each time, so an unchanged file always
/// yields the same sequence in file order.
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
}

impl Dataset {
    /// Wrap the dataset file at `path`
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Source file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole dataset in file order
    pub fn load(&self) -> Result<Vec<PhotoRecord>> {
        let data = fs::read_to_string(&self.path)?;
        parse_records(&data)
    }
}

fn field(input: &str) -> IResult<&str, &str> {
    take_till1(|c| c == ';')(input)
}

fn record_line(input: &str) -> IResult<&str, PhotoRecord> {
    let (input, url) = field(input)?;
    let (input, _) = char(';')(input)?;
    let (input, shows) = dec_u32(input)?;
    let (input, categories) = many0(preceded(char(';'), field))(input)?;
    Ok((
        input,
        PhotoRecord::new(url, shows, categories.iter().map(|c| c.to_string()).collect()),
    ))
}

pub(crate) fn parse_records(data: &str) -> Result<Vec<PhotoRecord>> {
    let mut records = Vec::new();
    for (idx, line) in data.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        match all_consuming(record_line)(line) {
            Ok((_, record)) => records.push(record),
            Err(err) => {
                return Err(Error::Dataset {
                    line: idx + 1,
                    reason: err.to_string(),
                })
            }
        }
    }
    Ok(records)
}
