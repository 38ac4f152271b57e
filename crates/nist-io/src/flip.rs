//! Mirror-flip transforms for tagged field values, grounded on
//! `nbis/lib/an2k/flip.c`'s `biomeval_nbis_flip_y_coord` and
//! `biomeval_nbis_flip_direction`.
//!
//! The original operates on a fixed-length substring embedded inside a
//! larger buffer, splicing the flipped value back in place; here the
//! caller already has the item's own value as an owned string (via
//! `nist_core`'s model), so these take and return a value string directly
//! and the caller re-renders it through `File::substitute_item`, reusing
//! the LEN-recompute path instead of hand-splicing bytes.

use crate::error::NistIoError;

/// Inverts a y-coordinate (0.01 mm units) against an image height in
/// pixels and a scan resolution in pixels/mm, preserving the input's
/// zero-padded width.
pub fn flip_y_coord(value: &str, image_height_px: u32, ppmm: f64) -> Result<String, NistIoError> {
    let width = value.len();
    let y: i64 = value
        .parse()
        .map_err(|_| NistIoError::Malformed(format!("non-numeric y-coordinate {value:?}")))?;
    let height_hundredths_mm = (image_height_px as f64 / ppmm) * 100.0;
    let flipped = (height_hundredths_mm - y as f64 - 1.0).round() as i64;
    render_fixed_width(flipped, width, "flipped y-coordinate")
}

/// Rotates a direction-in-degrees value 180 degrees, preserving the
/// input's zero-padded width.
pub fn flip_direction(value: &str) -> Result<String, NistIoError> {
    let width = value.len();
    let dir: i64 = value
        .parse()
        .map_err(|_| NistIoError::Malformed(format!("non-numeric direction {value:?}")))?;
    let flipped = (dir + 180).rem_euclid(360);
    render_fixed_width(flipped, width, "flipped direction")
}

fn render_fixed_width(value: i64, width: usize, what: &str) -> Result<String, NistIoError> {
    let rendered = format!("{value:0width$}");
    if rendered.len() != width {
        return Err(NistIoError::Malformed(format!(
            "{what} {rendered} does not fit in {width} characters"
        )));
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_coord_flips_against_image_height() {
        // 500px at 10 px/mm = 50mm = 5000 (0.01mm units); flipping y=120
        // lands at 5000 - 120 - 1 = 4879.
        let flipped = flip_y_coord("0120", 500, 10.0).unwrap();
        assert_eq!(flipped, "4879");
    }

    #[test]
    fn direction_flips_180_degrees_and_wraps() {
        assert_eq!(flip_direction("045").unwrap(), "225");
        assert_eq!(flip_direction("270").unwrap(), "090");
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        assert!(matches!(flip_direction("abc"), Err(NistIoError::Malformed(_))));
    }
}
