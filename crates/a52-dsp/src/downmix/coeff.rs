//! 下混系数.
//!
//! 下混本身只做相加, 各声道的增益在变换前乘到频域系数上.

use a52_core::levels::{LEVEL_3DB, LEVEL_6DB, LEVEL_PLUS3DB};
use a52_core::{A52Error, A52Result, ChannelMode};

use a52_core::ChannelMode::{
    Channel, Channel1, Channel2, Dolby, Mono, Stereo, ThreeFront as F3,
    ThreeFrontOneRear as F3R1, ThreeFrontTwoRear as F3R2, TwoFrontOneRear as F2R1,
    TwoFrontTwoRear as F2R2,
};

/// 各编码声道的增益
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixCoefficients {
    /// 按编码声道顺序的增益, 未用到的位置为 0
    pub gains: [f32; 5],
    /// 被混入其他声道的编码声道位掩码 (bit n 对应声道 n)
    pub mixed: u8,
}

impl MixCoefficients {
    fn new(mixed: u8) -> Self {
        Self {
            gains: [0.0; 5],
            mixed,
        }
    }

    fn set(mut self, positions: &[usize], gain: f32) -> Self {
        for &p in positions {
            self.gains[p] = gain;
        }
        self
    }
}

/// 计算 (编码模式, 输出模式) 组合的声道增益
pub fn mix_coefficients(
    coded: ChannelMode,
    output: ChannelMode,
    level: f32,
    clev: f32,
    slev: f32,
) -> A52Result<MixCoefficients> {
    let coded = coded.coded();
    let (mut clev, mut slev) = (clev, slev);

    // Dolby 目标使用固定的中置/环绕电平, 其余与立体声目标相同
    let target = match (coded, output) {
        (F3, Dolby) => {
            clev = LEVEL_3DB;
            Stereo
        }
        (F2R1, Dolby) => {
            slev = 1.0;
            Stereo
        }
        (F3R1, Dolby) => {
            clev = LEVEL_3DB;
            slev = 1.0;
            Stereo
        }
        (F2R2, Dolby) => {
            slev = LEVEL_3DB;
            Stereo
        }
        (F3R2, Dolby) => {
            clev = LEVEL_3DB;
            slev = LEVEL_3DB;
            Stereo
        }
        (F3R2, F2R1) => {
            slev = LEVEL_3DB;
            Stereo
        }
        _ => output,
    };

    let l = level;
    let coeffs = match (coded, target) {
        (Channel, Channel)
        | (Mono, Mono)
        | (Stereo, Stereo)
        | (F3, F3)
        | (F2R1, F2R1)
        | (F3R1, F3R1)
        | (F2R2, F2R2)
        | (F3R2, F3R2)
        | (Stereo, Dolby) => MixCoefficients::new(0).set(&[0, 1, 2, 3, 4], l),

        (Channel, Mono) => MixCoefficients::new(3).set(&[0, 1], l * LEVEL_6DB),
        (Stereo, Mono) => MixCoefficients::new(3).set(&[0, 1], l * LEVEL_3DB),
        (F3, Mono) => MixCoefficients::new(7)
            .set(&[0, 2], l * LEVEL_3DB)
            .set(&[1], l * clev * LEVEL_PLUS3DB),
        (F2R1, Mono) => MixCoefficients::new(7)
            .set(&[0, 1], l * LEVEL_3DB)
            .set(&[2], l * slev * LEVEL_3DB),
        (F2R2, Mono) => MixCoefficients::new(15)
            .set(&[0, 1], l * LEVEL_3DB)
            .set(&[2, 3], l * slev * LEVEL_3DB),
        (F3R1, Mono) => MixCoefficients::new(15)
            .set(&[0, 2], l * LEVEL_3DB)
            .set(&[1], l * clev * LEVEL_PLUS3DB)
            .set(&[3], l * slev * LEVEL_3DB),
        (F3R2, Mono) => MixCoefficients::new(31)
            .set(&[0, 2], l * LEVEL_3DB)
            .set(&[1], l * clev * LEVEL_PLUS3DB)
            .set(&[3, 4], l * slev * LEVEL_3DB),

        (Mono, Dolby) => MixCoefficients::new(0).set(&[0], l * LEVEL_3DB),

        (F3, Stereo) | (F3R1, F2R1) | (F3R2, F2R2) => MixCoefficients::new(7)
            .set(&[0, 2, 3, 4], l)
            .set(&[1], l * clev),
        (F2R1, Stereo) => MixCoefficients::new(7)
            .set(&[0, 1], l)
            .set(&[2], l * slev * LEVEL_3DB),
        (F3R1, Stereo) => MixCoefficients::new(15)
            .set(&[0, 2], l)
            .set(&[1], l * clev)
            .set(&[3], l * slev * LEVEL_3DB),
        (F2R2, Stereo) => MixCoefficients::new(15)
            .set(&[0, 1], l)
            .set(&[2, 3], l * slev),
        (F3R2, Stereo) => MixCoefficients::new(31)
            .set(&[0, 2], l)
            .set(&[1], l * clev)
            .set(&[3, 4], l * slev),

        (F3R1, F3) => MixCoefficients::new(13)
            .set(&[0, 1, 2], l)
            .set(&[3], l * slev * LEVEL_3DB),
        (F3R2, F3) => MixCoefficients::new(29)
            .set(&[0, 1, 2], l)
            .set(&[3, 4], l * slev),
        (F2R2, F2R1) => MixCoefficients::new(12)
            .set(&[0, 1], l)
            .set(&[2, 3], l * LEVEL_3DB),
        (F3R2, F3R1) => MixCoefficients::new(24)
            .set(&[0, 1, 2], l)
            .set(&[3, 4], l * LEVEL_3DB),
        (F2R1, F2R2) => MixCoefficients::new(0)
            .set(&[0, 1], l)
            .set(&[2], l * LEVEL_3DB),
        (F3R1, F2R2) => MixCoefficients::new(7)
            .set(&[0, 2], l)
            .set(&[1], l * clev)
            .set(&[3], l * LEVEL_3DB),
        (F3R1, F3R2) => MixCoefficients::new(0)
            .set(&[0, 1, 2], l)
            .set(&[3], l * LEVEL_3DB),

        (Channel, Channel1) => MixCoefficients::new(0).set(&[0], l),
        (Channel, Channel2) => MixCoefficients::new(0).set(&[1], l),

        _ => return Err(A52Error::UnsupportedConversion { coded, output }),
    };

    Ok(coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_pairs_are_unity() {
        for mode in [Channel, Mono, Stereo, F3, F2R1, F3R1, F2R2, F3R2] {
            let c = mix_coefficients(mode, mode, 0.5, LEVEL_3DB, LEVEL_3DB).unwrap();
            assert_eq!(c.gains, [0.5; 5], "{mode} -> {mode} 应为单位增益");
            assert_eq!(c.mixed, 0);
        }
        let c = mix_coefficients(Stereo, Dolby, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(c.gains, [1.0; 5]);
    }

    #[test]
    fn test_dolby_forces_fixed_levels() {
        // 码流中的 clev/slev 被忽略
        let c = mix_coefficients(F3R2, Dolby, 1.0, 0.5, 0.0).unwrap();
        assert_eq!(c.gains, [1.0, LEVEL_3DB, 1.0, LEVEL_3DB, LEVEL_3DB]);
        assert_eq!(c.mixed, 31);

        let c = mix_coefficients(F2R1, Dolby, 2.0, 0.5, 0.0).unwrap();
        assert_eq!(c.gains[2], 2.0 * LEVEL_3DB);
        assert_eq!(c.mixed, 7);
    }

    #[test]
    fn test_3f2r_to_2f1r_uses_fixed_surround_level() {
        let c = mix_coefficients(F3R2, F2R1, 1.0, 0.5, 0.0).unwrap();
        assert_eq!(c.gains, [1.0, 0.5, 1.0, LEVEL_3DB, LEVEL_3DB]);
        assert_eq!(c.mixed, 31);
    }

    #[test]
    fn test_mono_targets() {
        let c = mix_coefficients(Channel, Mono, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(&c.gains[..2], &[LEVEL_6DB, LEVEL_6DB]);
        assert_eq!(c.mixed, 3);

        let c = mix_coefficients(F3, Mono, 1.0, 0.5, 0.0).unwrap();
        assert_eq!(c.gains[0], LEVEL_3DB);
        assert_eq!(c.gains[1], 0.5 * LEVEL_PLUS3DB);
        assert_eq!(c.mixed, 7);

        let c = mix_coefficients(Mono, Dolby, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(c.gains[0], LEVEL_3DB);
        assert_eq!(c.mixed, 0);
    }

    #[test]
    fn test_dual_mono_selection() {
        let c1 = mix_coefficients(Channel, Channel1, 0.8, 0.0, 0.0).unwrap();
        assert_eq!(&c1.gains[..2], &[0.8, 0.0]);
        let c2 = mix_coefficients(Channel, Channel2, 0.8, 0.0, 0.0).unwrap();
        assert_eq!(&c2.gains[..2], &[0.0, 0.8]);
    }

    #[test]
    fn test_surround_reductions() {
        let c = mix_coefficients(F3R1, F3, 1.0, 0.0, 0.5).unwrap();
        assert_eq!(c.gains[3], 0.5 * LEVEL_3DB);
        assert_eq!(c.mixed, 13);
        let c = mix_coefficients(F2R2, F2R1, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(&c.gains[2..4], &[LEVEL_3DB, LEVEL_3DB]);
        assert_eq!(c.mixed, 12);
    }

    #[test]
    fn test_unsupported_pair() {
        assert_eq!(
            mix_coefficients(Mono, Stereo, 1.0, 0.0, 0.0),
            Err(A52Error::UnsupportedConversion {
                coded: Mono,
                output: Stereo
            })
        );
        assert!(mix_coefficients(Stereo, F3R2, 1.0, 0.0, 0.0).is_err());
    }
}
