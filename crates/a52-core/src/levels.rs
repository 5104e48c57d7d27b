//! A/52 混音电平常量.
//!
//! 下混系数只取自这一小组固定电平, 外加码流给出的中置/环绕混音电平.

/// +3 dB (√2)
pub const LEVEL_PLUS3DB: f32 = std::f32::consts::SQRT_2;
/// -3 dB (√2/2)
pub const LEVEL_3DB: f32 = std::f32::consts::FRAC_1_SQRT_2;
/// -6 dB
pub const LEVEL_6DB: f32 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_db_values() {
        let db = |v: f32| 20.0 * v.log10();
        assert!((db(LEVEL_3DB) + 3.0103).abs() < 1e-3);
        assert!((db(LEVEL_6DB) + 6.0206).abs() < 1e-3);
        assert!((db(LEVEL_PLUS3DB) - 3.0103).abs() < 1e-3);
    }
}
