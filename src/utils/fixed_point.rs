// src/utils/fixed_point.rs

/// Scale index values to int16, mapping undefined pixels to `nodata_value`.
///
/// Values are clamped so that scaled output never collides with the nodata
/// value or overflows.
pub fn to_fixed_point(data: &[Option<f32>], scale_factor: i32, nodata_value: i16) -> Vec<i16> {
    let lo = f32::from(if nodata_value == i16::MIN { i16::MIN + 1 } else { i16::MIN });
    let hi = f32::from(if nodata_value == i16::MAX { i16::MAX - 1 } else { i16::MAX });

    data.iter()
        .map(|value| match value {
            Some(v) => {
                let scaled = (v * scale_factor as f32).round().clamp(lo, hi) as i16;
                if scaled == nodata_value {
                    // Nudge toward zero to stay distinguishable from nodata
                    scaled - nodata_value.signum()
                } else {
                    scaled
                }
            }
            None => nodata_value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_and_marks_nodata() {
        let out = to_fixed_point(&[Some(0.6), None, Some(-0.25), Some(10.0)], 10000, -10000);
        assert_eq!(out, vec![6000, -10000, -2500, i16::MAX]);
    }

    #[test]
    fn valid_values_never_equal_nodata() {
        let out = to_fixed_point(&[Some(-1.0)], 10000, -10000);
        assert_eq!(out, vec![-9999]);
    }
}
