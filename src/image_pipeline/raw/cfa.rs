//! Color filter array layout.

use std::fmt;

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Repeat period of the supported Bayer patterns, in both axes.
pub const CFA_PERIOD: usize = 2;

/// Which filter sits over a sensor site.
///
/// Bayer sensors carry two green sites per 2x2 cell; they are kept apart as
/// `Green` and `GreenAlt` so each can be located on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfaColor {
    Red,
    Green,
    Blue,
    GreenAlt,
}

impl CfaColor {
    pub const ALL: [CfaColor; 4] = [CfaColor::Red, CfaColor::Green, CfaColor::Blue, CfaColor::GreenAlt];

    /// Conventional color code: R=0, G=1, B=2, second G=3.
    pub fn code(self) -> u8 {
        match self {
            CfaColor::Red => 0,
            CfaColor::Green => 1,
            CfaColor::Blue => 2,
            CfaColor::GreenAlt => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CfaColor::Red),
            1 => Some(CfaColor::Green),
            2 => Some(CfaColor::Blue),
            3 => Some(CfaColor::GreenAlt),
            _ => None,
        }
    }

    /// The color after folding the second green onto the first.
    pub fn merged_green(self) -> Self {
        match self {
            CfaColor::GreenAlt => CfaColor::Green,
            other => other,
        }
    }

    /// Index into per-channel level arrays.
    pub fn index(self) -> usize {
        self.code() as usize
    }
}

/// One 2x2 repeat cell of the sensor's CFA, indexed `[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfaPattern([[CfaColor; CFA_PERIOD]; CFA_PERIOD]);

impl CfaPattern {
    /// The common `RGGB` layout with the second green marked as `GreenAlt`.
    pub const RGGB: CfaPattern = CfaPattern([
        [CfaColor::Red, CfaColor::Green],
        [CfaColor::GreenAlt, CfaColor::Blue],
    ]);

    pub fn new(cells: [[CfaColor; CFA_PERIOD]; CFA_PERIOD]) -> Self {
        Self(cells)
    }

    pub fn from_codes(codes: [[u8; CFA_PERIOD]; CFA_PERIOD]) -> Result<Self> {
        let mut cells = [[CfaColor::Red; CFA_PERIOD]; CFA_PERIOD];
        for (row, row_codes) in codes.iter().enumerate() {
            for (col, &code) in row_codes.iter().enumerate() {
                cells[row][col] = CfaColor::from_code(code).ok_or_else(|| {
                    PipelineError::UnsupportedFormat(format!("CFA color code {code}"))
                })?;
            }
        }
        Ok(Self(cells))
    }

    pub fn color_at(&self, row: usize, col: usize) -> CfaColor {
        self.0[row % CFA_PERIOD][col % CFA_PERIOD]
    }

    pub fn period(&self) -> usize {
        CFA_PERIOD
    }

    /// Cell positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> {
        (0..CFA_PERIOD).flat_map(|row| (0..CFA_PERIOD).map(move |col| (row, col)))
    }

    /// Color codes as written to a CFAPattern tag, with `GreenAlt` folded onto
    /// `Green`. Several raw processors mishandle a pattern with four distinct codes.
    pub fn remapped_codes(&self) -> [[u8; CFA_PERIOD]; CFA_PERIOD] {
        self.0.map(|row| row.map(|color| color.merged_green().code()))
    }

    pub fn codes(&self) -> [[u8; CFA_PERIOD]; CFA_PERIOD] {
        self.0.map(|row| row.map(CfaColor::code))
    }
}

impl fmt::Display for CfaPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.0 {
            for color in row {
                let letter = match color {
                    CfaColor::Red => 'R',
                    CfaColor::Green | CfaColor::GreenAlt => 'G',
                    CfaColor::Blue => 'B',
                };
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}
