//! 输出模式解析与电平补偿.

use a52_core::levels::{LEVEL_3DB, LEVEL_PLUS3DB};
use a52_core::{A52Error, A52Result, ChannelMode, OutputRequest};

use a52_core::ChannelMode::{
    Channel, Channel1, Channel2, Dolby, Mono, Stereo, ThreeFront as F3,
    ThreeFrontOneRear as F3R1, ThreeFrontTwoRear as F3R2, TwoFrontOneRear as F2R1,
    TwoFrontTwoRear as F2R2,
};

/// 行: 请求的输出模式; 列: 编码 acmod
const OUTPUT_TABLE: [[ChannelMode; 8]; 11] = [
    [Channel, Dolby, Stereo, Stereo, Stereo, Stereo, Stereo, Stereo],
    [Mono, Mono, Mono, Mono, Mono, Mono, Mono, Mono],
    [Channel, Dolby, Stereo, Stereo, Stereo, Stereo, Stereo, Stereo],
    [Channel, Dolby, Stereo, F3, Stereo, F3, Stereo, F3],
    [Channel, Dolby, Stereo, Stereo, F2R1, F2R1, F2R1, F2R1],
    [Channel, Dolby, Stereo, Stereo, F2R1, F3R1, F2R1, F3R1],
    [Channel, Dolby, Stereo, F3, F2R2, F2R2, F2R2, F2R2],
    [Channel, Dolby, Stereo, F3, F2R2, F3R2, F2R2, F3R2],
    [Channel1, Mono, Mono, Mono, Mono, Mono, Mono, Mono],
    [Channel2, Mono, Mono, Mono, Mono, Mono, Mono, Mono],
    [Channel, Dolby, Stereo, Dolby, Dolby, Dolby, Dolby, Dolby],
];

/// 输出模式解析结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSelection {
    /// 实际输出模式
    pub mode: ChannelMode,
    /// 电平补偿后的输出电平
    pub level: f32,
}

/// 解析实际输出模式.
///
/// `coded` 为码流声道模式 (acmod, 或 Dolby Surround 编码的立体声记为 `Dolby`).
/// 请求 `adjust_level` 时按转换组合缩小 `level`, 避免下混后削波.
pub fn select_output(
    coded: ChannelMode,
    request: &OutputRequest,
    level: f32,
    clev: f32,
    slev: f32,
) -> A52Result<OutputSelection> {
    if matches!(coded, Channel1 | Channel2) {
        return Err(A52Error::InvalidCodedMode(u32::from(coded.as_u8())));
    }

    let row = &OUTPUT_TABLE[request.mode.as_u8() as usize];
    let mut mode = row[coded.acmod() as usize];

    if mode == Stereo && (coded == Dolby || (coded == F3 && clev == LEVEL_3DB)) {
        mode = Dolby;
    }

    let level = if request.adjust_level {
        adjusted_level(coded.coded(), mode, level, clev, slev)
    } else {
        level
    };

    Ok(OutputSelection { mode, level })
}

fn adjusted_level(input: ChannelMode, output: ChannelMode, level: f32, clev: f32, slev: f32) -> f32 {
    match (input, output) {
        (F3, Mono) => level * (LEVEL_3DB / (1.0 + clev)),

        (Stereo, Mono) | (F2R2, F2R1) | (F3R2, F3R1) => level * LEVEL_3DB,
        (F3R2, F2R1) if clev < LEVEL_PLUS3DB - 1.0 => level * LEVEL_3DB,

        (F3R2, F2R1) | (F3, Stereo) | (F3R1, F2R1) | (F3R1, F2R2) | (F3R2, F2R2) => {
            level / (1.0 + clev)
        }

        (F2R1, Mono) => level * (LEVEL_PLUS3DB / (2.0 + slev)),
        (F2R1, Stereo) | (F3R1, F3) => level / (1.0 + slev * LEVEL_3DB),
        (F3R1, Mono) => level * (LEVEL_3DB / (1.0 + clev + 0.5 * slev)),
        (F3R1, Stereo) => level / (1.0 + clev + slev * LEVEL_3DB),
        (F2R2, Mono) => level * (LEVEL_3DB / (1.0 + slev)),
        (F2R2, Stereo) | (F3R2, F3) => level / (1.0 + slev),
        (F3R2, Mono) => level * (LEVEL_3DB / (1.0 + clev + slev)),
        (F3R2, Stereo) => level / (1.0 + clev + slev),

        (Mono, Dolby) => level * LEVEL_PLUS3DB,
        (F3, Dolby) | (F2R1, Dolby) => level * (1.0 / (1.0 + LEVEL_3DB)),
        (F3R1, Dolby) | (F2R2, Dolby) => level * (1.0 / (1.0 + 2.0 * LEVEL_3DB)),
        (F3R2, Dolby) => level * (1.0 / (1.0 + 3.0 * LEVEL_3DB)),

        _ => level,
    }
}
