//! Deterministic hand-shake jitter for black/white artwork.
//!
//! A frame is produced in three pure stages: [`mask::extract_mask`] thresholds
//! the source into an ink mask, [`displacement::generate_displacement`] builds
//! a seeded value-noise offset field, and [`resample::remap`] pulls the mask
//! through that field before [`resample::compose`] turns it into pixels.
//! [`frame::render_frame`] runs all three; [`sequence::render_sequence`] runs
//! one frame per seed.

pub mod decoding;
pub mod displacement;
pub mod encoding;
pub mod error;
pub mod error_codes;
pub mod frame;
pub mod grid;
pub mod manifest;
pub mod mask;
pub mod resample;
pub mod rng;
pub mod schema;
pub mod sequence;

pub use displacement::{generate_displacement, DisplacementField};
pub use error::ShakeError;
pub use frame::{render_frame, RenderParams};
pub use grid::ScalarGrid;
pub use mask::{extract_mask, extract_mask_raw, RawImage};
pub use resample::{compose, remap, RenderMode, SampleFilter};
pub use sequence::{render_sequence, stream_sequence};
