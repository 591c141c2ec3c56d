//! Lossless codec for two-dimensional grids of integer sea-level heights.
//!
//! A text grid (whitespace-separated decimal rows) becomes a
//! self-describing `BPR5` container and back, byte-for-byte up to the
//! normalized separators. Each row is coded against its predecessor with
//! the best of four predictors (LEFT, UP, PAETH, MED) and the better of
//! two delta modes; residuals are ZigZag-mapped, varint-coded, and packed
//! into 8-row blocks, each wrapped in an independent LZMA stream.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod grid;
pub mod lzma;
pub mod predict;
pub mod residual;

pub use decoder::decode;
pub use encoder::{encode, encode_grid};
pub use error::{Error, Result};
pub use format::{Header, BLOCK_ROWS, MAGIC};
pub use grid::Grid;
pub use predict::Predictor;
pub use residual::DeltaMode;
