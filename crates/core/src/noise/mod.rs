//! Procedural noise for smoke detail

pub mod worley;

pub use worley::{fbm_worley, worley, WorleyConfig, WorleyNoiseField};
