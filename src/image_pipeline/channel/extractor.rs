use ndarray::{s, Array2};
use tracing::debug;

use crate::image_pipeline::channel::types::ChannelGrid;
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::raw::{CfaColor, CfaPattern, RawCapture};

/// Row/column of the first site carrying `color`, scanning the pattern row-major.
pub fn locate_color(pattern: &CfaPattern, color: CfaColor) -> Result<(usize, usize)> {
    pattern
        .positions()
        .find(|&(row, col)| pattern.color_at(row, col) == color)
        .ok_or(PipelineError::ColorNotFound(color))
}

/// Copies every `period`-th sample in both axes starting at the given offset.
///
/// The source grid is left untouched. For even dimensions and `period == 2` the
/// result has shape `(rows / 2, cols / 2)`.
pub fn extract(
    raw: &Array2<u16>,
    row_offset: usize,
    col_offset: usize,
    period: usize,
) -> Result<ChannelGrid> {
    if period == 0 || row_offset >= period || col_offset >= period {
        return Err(PipelineError::InvalidOffset {
            row: row_offset,
            col: col_offset,
            period,
        });
    }
    let (rows, cols) = raw.dim();
    if row_offset > rows || col_offset > cols {
        return Err(PipelineError::InvalidDimensions(cols, rows));
    }

    let step = period as isize;
    let samples = raw
        .slice(s![row_offset..;step, col_offset..;step])
        .to_owned();

    Ok(ChannelGrid {
        row_offset,
        col_offset,
        period,
        samples,
    })
}

/// Locates `color` in the capture's CFA and extracts its samples.
pub fn extract_color(capture: &RawCapture, color: CfaColor) -> Result<ChannelGrid> {
    let (row, col) = locate_color(&capture.cfa, color)?;
    let grid = extract(&capture.data, row, col, capture.cfa.period())?;
    debug!(?color, row, col, shape = ?grid.dim(), "Extracted channel");
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// All 24 arrangements of the four colors in a 2x2 cell.
    fn all_patterns() -> Vec<CfaPattern> {
        let mut patterns = Vec::new();
        let codes = [0u8, 1, 2, 3];
        for a in codes {
            for b in codes {
                for c in codes {
                    for d in codes {
                        let mut cell = [a, b, c, d];
                        cell.sort();
                        if cell == [0, 1, 2, 3] {
                            patterns.push(CfaPattern::from_codes([[a, b], [c, d]]).unwrap());
                        }
                    }
                }
            }
        }
        patterns
    }

    fn ramp(rows: usize, cols: usize) -> Array2<u16> {
        Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as u16)
    }

    #[test]
    fn test_locate_partitions_the_cell() {
        let patterns = all_patterns();
        assert_eq!(patterns.len(), 24);

        for pattern in patterns {
            let mut offsets: Vec<(usize, usize)> = CfaColor::ALL
                .iter()
                .map(|&color| locate_color(&pattern, color).unwrap())
                .collect();
            offsets.sort();
            assert_eq!(offsets, vec![(0, 0), (0, 1), (1, 0), (1, 1)], "pattern {pattern:?}");
        }
    }

    #[test]
    fn test_locate_missing_color() {
        // Two plain greens, no GreenAlt
        let pattern = CfaPattern::new([
            [CfaColor::Red, CfaColor::Green],
            [CfaColor::Green, CfaColor::Blue],
        ]);
        assert_eq!(locate_color(&pattern, CfaColor::Green).unwrap(), (0, 1));
        assert!(matches!(
            locate_color(&pattern, CfaColor::GreenAlt),
            Err(PipelineError::ColorNotFound(CfaColor::GreenAlt))
        ));
    }

    #[test]
    fn test_extract_shape_and_values() {
        let raw = ramp(4, 6);
        let grid = extract(&raw, 1, 0, 2).unwrap();

        assert_eq!(grid.dim(), (2, 3));
        assert_eq!(grid.samples[[0, 0]], raw[[1, 0]]);
        assert_eq!(grid.samples[[1, 2]], raw[[3, 4]]);
        assert_eq!(grid.min_max(), Some((6, 22)));
    }

    #[test]
    fn test_extractions_cover_every_sample_once() {
        let (rows, cols) = (6, 8);
        let raw = ramp(rows, cols);
        let mut hits = Array2::<u8>::zeros((rows, cols));

        for color in CfaColor::ALL {
            let (r0, c0) = locate_color(&CfaPattern::RGGB, color).unwrap();
            let grid = extract(&raw, r0, c0, 2).unwrap();
            assert_eq!(grid.dim(), (rows / 2, cols / 2));
            for ((i, j), &value) in grid.samples.indexed_iter() {
                let (r, c) = (r0 + 2 * i, c0 + 2 * j);
                assert_eq!(value, raw[[r, c]]);
                hits[[r, c]] += 1;
            }
        }
        assert!(hits.iter().all(|&h| h == 1));
    }

    #[test]
    fn test_extract_does_not_mutate_source() {
        let raw = ramp(4, 4);
        let before = raw.clone();
        let _ = extract(&raw, 1, 1, 2).unwrap();
        assert_eq!(raw, before);
    }

    #[test]
    fn test_extract_rejects_bad_offsets() {
        let raw = ramp(4, 4);
        assert!(matches!(extract(&raw, 2, 0, 2), Err(PipelineError::InvalidOffset { .. })));
        assert!(matches!(extract(&raw, 0, 0, 0), Err(PipelineError::InvalidOffset { .. })));

        let empty = Array2::<u16>::zeros((0, 0));
        assert!(matches!(extract(&empty, 1, 1, 2), Err(PipelineError::InvalidDimensions(0, 0))));
    }

    #[test]
    fn test_odd_dimensions_round_up_from_offset_zero() {
        let raw = ramp(5, 3);
        assert_eq!(extract(&raw, 0, 0, 2).unwrap().dim(), (3, 2));
        assert_eq!(extract(&raw, 1, 1, 2).unwrap().dim(), (2, 1));
    }
}
