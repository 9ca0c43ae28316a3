//! Random dataset generator (development tooling)

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;

const MAX_SHOWS: u32 = 5;
const MAX_CATEGORIES_PER_PHOTO: usize = 10;

const CATEGORIES: [&str; 15] = [
    "animals",
    "birds",
    "forest",
    "childrens",
    "clouds",
    "smartphones",
    "electronics",
    "music",
    "lakes",
    "computers",
    "school",
    "tourism",
    "fishing",
    "space",
    "science",
];

/// Write `count` random dataset records to `out`
pub fn run(out: &str, count: usize, site_url: &str) -> Result<()> {
    let mut rng = rand::rng();
    let mut vocab = CATEGORIES.to_vec();
    let file = File::create(out)?;
    let mut writer = BufWriter::new(file);

    for n in 0..count {
        vocab.shuffle(&mut rng);
        let picked = rng.random_range(1..=MAX_CATEGORIES_PER_PHOTO);
        let categories = vocab[..picked].join(";");
        let shows = rng.random_range(1..=MAX_SHOWS);
        writeln!(
            writer,
            "{}/static/image{}.png;{};{}",
            site_url, n, shows, categories
        )?;
    }
    writer.flush()?;

    Ok(())
}
