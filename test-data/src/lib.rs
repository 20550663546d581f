use lazy_static::lazy_static;
use rand::prelude::*;
use std::collections::HashMap;

mod generated;
mod samples;
mod turtle;

pub use crate::generated::{generate, GeneratedGrid};
pub use crate::turtle::{Outcome, Turtle};

pub struct GridData {
    pub text: &'static str,
    pub expected: Outcome,
}

fn grid_data(data: samples::Data) -> GridData {
    GridData {
        text: data.text(),
        expected: data.exec(),
    }
}

lazy_static! {
    static ref SAMPLES: HashMap<&'static str, GridData> = {
        let mut grids = HashMap::new();

        grids.insert("square", grid_data(samples::SQUARE_DATA));
        grids.insert("spiral", grid_data(samples::SPIRAL_DATA));
        grids.insert("countdown", grid_data(samples::COUNTDOWN_DATA));
        grids.insert("branches", grid_data(samples::BRANCHES_DATA));
        grids.insert("fractions", grid_data(samples::FRACTIONS_DATA));
        grids.insert("aliases", grid_data(samples::ALIASES_DATA));

        grids
    };
}

/// Hand written grids keyed by name.
pub fn get_all_grids() -> &'static HashMap<&'static str, GridData> {
    &SAMPLES
}

/// `count` random programs; the same seed always gives the same programs.
pub fn get_random_grids(seed: u64, count: usize) -> Vec<GeneratedGrid> {
    let mut rng = StdRng::seed_from_u64(seed);
    std::iter::repeat_with(|| generate(rng.gen())).take(count).collect()
}
