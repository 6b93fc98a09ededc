//! Channel grid types

use ndarray::Array2;

/// Samples of one CFA color, subsampled from a full raw grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelGrid {
    /// Row of the first sample in the source grid
    pub row_offset: usize,
    /// Column of the first sample in the source grid
    pub col_offset: usize,
    /// Stride in both axes
    pub period: usize,
    pub samples: Array2<u16>,
}

impl ChannelGrid {
    pub fn dim(&self) -> (usize, usize) {
        self.samples.dim()
    }

    /// Smallest and largest sample, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(u16, u16)> {
        self.samples.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
