use ndarray::{s, Array2};
use tracing::debug;

use crate::image_pipeline::channel::{locate_color, ChannelGrid};
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::raw::{CfaColor, CfaPattern, CFA_PERIOD};

/// Full-size mosaic being assembled from several captures.
///
/// Each CFA color's sites are overwritten by exactly one channel grid. Sites of
/// different colors never overlap, so the write order does not matter.
#[derive(Debug, Clone)]
pub struct MergedRawBuffer {
    data: Array2<u16>,
    cfa: CfaPattern,
    written: [[bool; CFA_PERIOD]; CFA_PERIOD],
}

impl MergedRawBuffer {
    /// Starts from a full raw grid; its samples survive only where no channel is written.
    pub fn from_base(data: Array2<u16>, cfa: CfaPattern) -> Self {
        Self {
            data,
            cfa,
            written: [[false; CFA_PERIOD]; CFA_PERIOD],
        }
    }

    pub fn cfa(&self) -> &CfaPattern {
        &self.cfa
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Writes `grid` over every site of `color`.
    ///
    /// The grid must have been extracted at the offset where the base pattern
    /// holds `color`, with matching shape.
    pub fn write_channel(&mut self, color: CfaColor, grid: &ChannelGrid) -> Result<()> {
        let (row, col) = locate_color(&self.cfa, color)?;
        if (grid.row_offset, grid.col_offset) != (row, col) || grid.period != CFA_PERIOD {
            return Err(PipelineError::PatternMismatch {
                color,
                expected: (row, col),
                actual: (grid.row_offset, grid.col_offset),
            });
        }
        if self.written[row][col] {
            return Err(PipelineError::DuplicateWrite(color));
        }

        let step = CFA_PERIOD as isize;
        let mut target = self.data.slice_mut(s![row..;step, col..;step]);
        if target.dim() != grid.dim() {
            return Err(PipelineError::ShapeMismatch {
                expected: target.dim(),
                actual: grid.dim(),
            });
        }
        target.assign(&grid.samples);
        self.written[row][col] = true;

        debug!(?color, row, col, "Merged channel");
        Ok(())
    }

    /// Colors whose sites have not been written yet.
    pub fn missing(&self) -> Vec<CfaColor> {
        self.cfa
            .positions()
            .filter(|&(r, c)| !self.written[r][c])
            .map(|(r, c)| self.cfa.color_at(r, c))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Saturating per-site black subtraction, `levels` indexed like the CFA cell.
    pub fn subtract_black_levels(&mut self, levels: [[u16; CFA_PERIOD]; CFA_PERIOD]) {
        let step = CFA_PERIOD as isize;
        for (row, col) in self.cfa.positions() {
            let black = levels[row][col];
            self.data
                .slice_mut(s![row..;step, col..;step])
                .mapv_inplace(|v| v.saturating_sub(black));
        }
    }

    /// Hands back the finished mosaic. Fails if any CFA color was never written.
    pub fn into_mosaic(self) -> Result<Array2<u16>> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(PipelineError::IncompleteMerge(missing));
        }
        Ok(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::channel::extract;

    const ROWS: usize = 4;
    const COLS: usize = 6;

    fn filled(value: u16) -> Array2<u16> {
        Array2::from_elem((ROWS, COLS), value)
    }

    fn grid_for(color: CfaColor, source: &Array2<u16>) -> ChannelGrid {
        let (r, c) = locate_color(&CfaPattern::RGGB, color).unwrap();
        extract(source, r, c, CFA_PERIOD).unwrap()
    }

    fn merge_in_order(order: &[CfaColor]) -> Array2<u16> {
        let red = filled(100);
        let green = filled(200);
        let blue = filled(300);
        let mut merged = MergedRawBuffer::from_base(blue.clone(), CfaPattern::RGGB);
        for &color in order {
            let source = match color {
                CfaColor::Red => &red,
                CfaColor::Green | CfaColor::GreenAlt => &green,
                CfaColor::Blue => &blue,
            };
            merged.write_channel(color, &grid_for(color, source)).unwrap();
        }
        merged.into_mosaic().unwrap()
    }

    #[test]
    fn test_merge_places_each_capture() {
        let mosaic = merge_in_order(&[CfaColor::Blue, CfaColor::Green, CfaColor::GreenAlt, CfaColor::Red]);
        assert_eq!(mosaic[[0, 0]], 100);
        assert_eq!(mosaic[[0, 1]], 200);
        assert_eq!(mosaic[[1, 0]], 200);
        assert_eq!(mosaic[[1, 1]], 300);
        assert_eq!(mosaic[[2, 4]], 100);
        assert_eq!(mosaic[[3, 5]], 300);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let reference = merge_in_order(&[CfaColor::Blue, CfaColor::Green, CfaColor::GreenAlt, CfaColor::Red]);
        let orders = [
            [CfaColor::Red, CfaColor::Green, CfaColor::GreenAlt, CfaColor::Blue],
            [CfaColor::GreenAlt, CfaColor::Red, CfaColor::Blue, CfaColor::Green],
            [CfaColor::Green, CfaColor::Blue, CfaColor::Red, CfaColor::GreenAlt],
        ];
        for order in orders {
            assert_eq!(merge_in_order(&order), reference, "order {order:?}");
        }
    }

    #[test]
    fn test_incomplete_merge_is_rejected() {
        let base = filled(0);
        let mut merged = MergedRawBuffer::from_base(base.clone(), CfaPattern::RGGB);
        merged.write_channel(CfaColor::Red, &grid_for(CfaColor::Red, &base)).unwrap();

        assert!(!merged.is_complete());
        assert_eq!(merged.missing(), vec![CfaColor::Green, CfaColor::GreenAlt, CfaColor::Blue]);
        assert!(matches!(merged.into_mosaic(), Err(PipelineError::IncompleteMerge(_))));
    }

    #[test]
    fn test_duplicate_write_is_rejected() {
        let base = filled(0);
        let mut merged = MergedRawBuffer::from_base(base.clone(), CfaPattern::RGGB);
        let grid = grid_for(CfaColor::Blue, &base);
        merged.write_channel(CfaColor::Blue, &grid).unwrap();
        assert!(matches!(
            merged.write_channel(CfaColor::Blue, &grid),
            Err(PipelineError::DuplicateWrite(CfaColor::Blue))
        ));
    }

    #[test]
    fn test_grid_from_wrong_offset_is_rejected() {
        let base = filled(0);
        let mut merged = MergedRawBuffer::from_base(base.clone(), CfaPattern::RGGB);
        let red_grid = grid_for(CfaColor::Red, &base);
        assert!(matches!(
            merged.write_channel(CfaColor::Blue, &red_grid),
            Err(PipelineError::PatternMismatch { .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let mut merged = MergedRawBuffer::from_base(filled(0), CfaPattern::RGGB);
        let small = Array2::<u16>::zeros((2, 2));
        let grid = extract(&small, 0, 0, CFA_PERIOD).unwrap();
        assert!(matches!(
            merged.write_channel(CfaColor::Red, &grid),
            Err(PipelineError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_subtract_black_levels_saturates() {
        let mut merged = MergedRawBuffer::from_base(filled(50), CfaPattern::RGGB);
        merged.subtract_black_levels([[10, 20], [20, 60]]);
        let data = merged.data;
        assert_eq!(data[[0, 0]], 40);
        assert_eq!(data[[0, 1]], 30);
        assert_eq!(data[[1, 0]], 30);
        assert_eq!(data[[1, 1]], 0);
    }
}
