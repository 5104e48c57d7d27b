//! PCM 量化与交错.
//!
//! 合成阶段的样本带有偏置 (默认 384), 使 [-1, 1) 的信号落在 [383, 385) 内,
//! 这一区间里 f32 的最低位恰好是 2^-15, 即一个 16 位 PCM 步长.
//! 量化时去掉偏置、乘以 32768 并饱和到 i16.

use a52_core::{A52Error, A52Result, ChannelLayout, ChannelMode};
use serde::{Deserialize, Serialize};

use crate::block::{BLOCK_LEN, SampleBlock};

/// 默认偏置
pub const DEFAULT_BIAS: f32 = 384.0;

/// 默认缩放 (一个 LSB = 2^-15)
pub const DEFAULT_SCALE: f32 = 32768.0;

/// 浮点到 i16 的量化参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantizer {
    /// 样本中携带的偏置
    pub bias: f32,
    /// 去偏置后的缩放
    pub scale: f32,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self {
            bias: DEFAULT_BIAS,
            scale: DEFAULT_SCALE,
        }
    }
}

impl Quantizer {
    /// 创建量化器
    pub const fn new(bias: f32, scale: f32) -> Self {
        Self { bias, scale }
    }

    /// 量化单个样本, 返回 (值, 是否削波).
    ///
    /// NaN 按正向削波处理, 输出 `i16::MAX` 并计入削波.
    #[inline]
    pub fn quantize(&self, sample: f32) -> (i16, bool) {
        let x = (sample - self.bias) * self.scale;
        if x.is_nan() {
            return (i16::MAX, true);
        }
        let v = x.round() as i32;
        if v > i32::from(i16::MAX) {
            (i16::MAX, true)
        } else if v < i32::from(i16::MIN) {
            (i16::MIN, true)
        } else {
            (v as i16, false)
        }
    }
}

/// 交错输出中的一个槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// 取自第 n 个全带宽声道
    Channel(usize),
    /// 取自 LFE
    Lfe,
    /// 恒为 0
    Silent,
}

use self::Slot::{Channel as Ch, Lfe, Silent};

/// 交错输出布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLayout {
    mode: ChannelMode,
    lfe: bool,
    slots: &'static [Slot],
}

impl OutputLayout {
    /// 按输出模式与 LFE 选择布局.
    ///
    /// 槽位顺序为 L, R, Ls, Rs, C, LFE; 输出模式里的声道仍按编码顺序存放
    /// (如 3F 为 L, C, R), 这里完成重排.
    pub fn for_mode(mode: ChannelMode, lfe: bool) -> A52Result<Self> {
        let slots: &'static [Slot] = match (mode, lfe) {
            (ChannelMode::Mono, false) => &[Ch(0)],
            (ChannelMode::Mono, true) => &[Silent, Silent, Silent, Silent, Ch(0), Lfe],
            (ChannelMode::Stereo | ChannelMode::Dolby | ChannelMode::Channel, false) => {
                &[Ch(0), Ch(1)]
            }
            (ChannelMode::Stereo | ChannelMode::Dolby | ChannelMode::Channel, true) => {
                &[Ch(0), Ch(1), Silent, Silent, Silent, Lfe]
            }
            (ChannelMode::Channel1 | ChannelMode::Channel2, false) => &[Ch(0), Ch(0)],
            (ChannelMode::Channel1 | ChannelMode::Channel2, true) => {
                &[Ch(0), Ch(0), Silent, Silent, Silent, Lfe]
            }
            (ChannelMode::ThreeFront, false) => &[Ch(0), Ch(2), Silent, Silent, Ch(1)],
            (ChannelMode::ThreeFront, true) => &[Ch(0), Ch(2), Silent, Silent, Ch(1), Lfe],
            (ChannelMode::TwoFrontTwoRear, false) => &[Ch(0), Ch(1), Ch(2), Ch(3)],
            (ChannelMode::TwoFrontTwoRear, true) => &[Ch(0), Ch(1), Ch(2), Ch(3), Silent, Lfe],
            (ChannelMode::ThreeFrontTwoRear, false) => &[Ch(0), Ch(2), Ch(3), Ch(4), Ch(1)],
            (ChannelMode::ThreeFrontTwoRear, true) => {
                &[Ch(0), Ch(2), Ch(3), Ch(4), Ch(1), Lfe]
            }
            (ChannelMode::TwoFrontOneRear | ChannelMode::ThreeFrontOneRear, _) => {
                return Err(A52Error::UnsupportedLayout { mode, lfe });
            }
        };
        Ok(Self { mode, lfe, slots })
    }

    /// 输出模式
    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    /// 是否含 LFE 槽位
    pub fn has_lfe(&self) -> bool {
        self.lfe
    }

    /// 交错声道数
    pub fn channels(&self) -> usize {
        self.slots.len()
    }

    /// 槽位列表
    pub fn slots(&self) -> &'static [Slot] {
        self.slots
    }

    /// 每块输出的样本总数
    pub fn samples_per_block(&self) -> usize {
        BLOCK_LEN * self.slots.len()
    }

    /// 槽位对应的扬声器布局
    pub fn channel_layout(&self) -> ChannelLayout {
        match self.slots.len() {
            1 => ChannelLayout::MONO,
            2 => ChannelLayout::STEREO,
            4 => ChannelLayout::QUAD,
            5 => ChannelLayout::SURROUND_5_0,
            _ => ChannelLayout::SURROUND_5_1,
        }
    }
}

/// 量化并交错一个块, 返回削波样本数.
///
/// `out` 长度必须为 `256 × 声道数`.
pub fn quantize_interleave(
    block: &SampleBlock,
    layout: &OutputLayout,
    quantizer: &Quantizer,
    out: &mut [i16],
) -> A52Result<usize> {
    let stride = layout.channels();
    if out.len() != BLOCK_LEN * stride {
        return Err(A52Error::InvalidArgument(format!(
            "交错输出长度应为 {}, 实际为 {}",
            BLOCK_LEN * stride,
            out.len()
        )));
    }

    let mut clipped = 0;
    for (slot_index, slot) in layout.slots.iter().enumerate() {
        let source = match *slot {
            Ch(n) => &block.channels[n],
            Lfe => &block.lfe,
            Silent => {
                for frame in out.chunks_exact_mut(stride) {
                    frame[slot_index] = 0;
                }
                continue;
            }
        };
        for (frame, &sample) in out.chunks_exact_mut(stride).zip(source.iter()) {
            let (value, clip) = quantizer.quantize(sample);
            frame[slot_index] = value;
            clipped += usize::from(clip);
        }
    }

    if clipped > 0 {
        log::trace!("量化削波 {clipped} 个样本");
    }
    Ok(clipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LSB: f32 = 1.0 / 32768.0;

    #[test]
    fn test_quantize_boundaries() {
        let q = Quantizer::default();
        assert_eq!(q.quantize(384.0), (0, false));
        assert_eq!(q.quantize(384.0 + 32767.0 * LSB), (32767, false));
        assert_eq!(q.quantize(384.0 + 32768.0 * LSB), (32767, true));
        assert_eq!(q.quantize(385.0), (32767, true));
        assert_eq!(q.quantize(383.0), (-32768, false));
        assert_eq!(q.quantize(382.0), (-32768, true));
        assert_eq!(q.quantize(384.0 - LSB), (-1, false));
    }

    #[test]
    fn test_quantize_non_finite_counts_as_clip() {
        let q = Quantizer::default();
        assert_eq!(q.quantize(f32::NAN), (i16::MAX, true), "NaN 应饱和并计入削波");
        assert_eq!(q.quantize(f32::INFINITY), (i16::MAX, true));
        assert_eq!(q.quantize(f32::NEG_INFINITY), (i16::MIN, true));
    }

    #[test]
    fn test_quantize_custom_scale() {
        let q = Quantizer::new(0.0, 1.0);
        assert_eq!(q.quantize(1234.4), (1234, false));
        assert_eq!(q.quantize(-40000.0), (i16::MIN, true));
    }

    #[test]
    fn test_layout_slots() {
        let l = OutputLayout::for_mode(ChannelMode::ThreeFrontTwoRear, true).unwrap();
        assert_eq!(l.channels(), 6);
        assert_eq!(l.slots(), &[Ch(0), Ch(2), Ch(3), Ch(4), Ch(1), Lfe]);
        assert_eq!(l.channel_layout(), ChannelLayout::SURROUND_5_1);

        let l = OutputLayout::for_mode(ChannelMode::ThreeFront, false).unwrap();
        assert_eq!(l.channels(), 5);
        assert_eq!(l.channel_layout(), ChannelLayout::SURROUND_5_0);

        let l = OutputLayout::for_mode(ChannelMode::Mono, false).unwrap();
        assert_eq!(l.channel_layout(), ChannelLayout::MONO);

        assert_eq!(
            OutputLayout::for_mode(ChannelMode::TwoFrontOneRear, false),
            Err(A52Error::UnsupportedLayout {
                mode: ChannelMode::TwoFrontOneRear,
                lfe: false
            })
        );
        assert!(OutputLayout::for_mode(ChannelMode::ThreeFrontOneRear, true).is_err());
    }

    #[test]
    fn test_interleave_3f2r_order() {
        let mut block = SampleBlock::filled(DEFAULT_BIAS);
        // 编码顺序 L, C, R, Ls, Rs
        for (n, ch) in block.channels.iter_mut().enumerate() {
            ch.fill(DEFAULT_BIAS + (n as f32 + 1.0) * 100.0 * LSB);
        }
        block.lfe.fill(DEFAULT_BIAS + 600.0 * LSB);

        let layout = OutputLayout::for_mode(ChannelMode::ThreeFrontTwoRear, true).unwrap();
        let mut out = vec![0i16; layout.samples_per_block()];
        let clipped =
            quantize_interleave(&block, &layout, &Quantizer::default(), &mut out).unwrap();
        assert_eq!(clipped, 0);
        assert_eq!(&out[..6], &[100, 300, 400, 500, 200, 600]);
        assert_eq!(&out[out.len() - 6..], &[100, 300, 400, 500, 200, 600]);
    }

    #[test]
    fn test_interleave_silent_slots_and_clip_count() {
        let mut block = SampleBlock::filled(DEFAULT_BIAS);
        block.channels[0].fill(390.0);
        block.lfe.fill(DEFAULT_BIAS + 7.0 * LSB);
        // 未使用的声道即使有越界值也不应影响输出
        block.channels[3].fill(1000.0);

        let layout = OutputLayout::for_mode(ChannelMode::Stereo, true).unwrap();
        let mut out = vec![1i16; layout.samples_per_block()];
        let clipped =
            quantize_interleave(&block, &layout, &Quantizer::default(), &mut out).unwrap();
        assert_eq!(clipped, BLOCK_LEN, "只有左声道削波");
        for frame in out.chunks_exact(6) {
            assert_eq!(frame, &[32767, 0, 0, 0, 0, 7]);
        }
    }

    #[test]
    fn test_interleave_dual_mono_duplicates() {
        let mut block = SampleBlock::filled(DEFAULT_BIAS);
        block.channels[0].fill(DEFAULT_BIAS + 11.0 * LSB);
        block.channels[1].fill(DEFAULT_BIAS + 22.0 * LSB);
        let layout = OutputLayout::for_mode(ChannelMode::Channel2, false).unwrap();
        let mut out = vec![0i16; layout.samples_per_block()];
        quantize_interleave(&block, &layout, &Quantizer::default(), &mut out).unwrap();
        assert!(out.iter().all(|&v| v == 11), "两个槽位都取声道 0");
    }

    #[test]
    fn test_interleave_rejects_wrong_length() {
        let block = SampleBlock::filled(DEFAULT_BIAS);
        let layout = OutputLayout::for_mode(ChannelMode::Stereo, false).unwrap();
        let mut out = vec![0i16; 100];
        assert!(matches!(
            quantize_interleave(&block, &layout, &Quantizer::default(), &mut out),
            Err(A52Error::InvalidArgument(_))
        ));
    }
}
