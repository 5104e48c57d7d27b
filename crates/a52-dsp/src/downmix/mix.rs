//! 原地下混/上混.
//!
//! 所有组合都由少量相加原语拼成. 原语的实现由 [`MixKernel`] 提供,
//! 标量参考实现为 [`ScalarMix`], 分道实现在 `backend::lanes`.
//! 每个原语先读后写同一采样位置, 调用顺序决定结果, 不可调换.

use a52_core::ChannelMode;
use a52_core::ChannelMode::{
    Channel, Channel2, Dolby, Mono, Stereo, ThreeFront as F3, ThreeFrontOneRear as F3R1,
    ThreeFrontTwoRear as F3R2, TwoFrontOneRear as F2R1, TwoFrontTwoRear as F2R2,
};

use crate::block::{BLOCK_LEN, MAX_CHANNELS, SubBlock};

/// 一个块的全部全带宽声道
pub type Channels = [SubBlock; MAX_CHANNELS];

/// 混音原语.
///
/// 固定从声道 0 开始的原语直接作用于整组声道, 其余原语显式给出参与的子块.
/// 注释中 s0..s4 为编码顺序的声道, b 为偏置.
pub trait MixKernel {
    /// dest += src + b
    fn mix2to1(dest: &mut SubBlock, src: &SubBlock, bias: f32);
    /// s0 += s1 + s2 + b
    fn mix3to1(ch: &mut Channels, bias: f32);
    /// s0 += s1 + s2 + s3 + b
    fn mix4to1(ch: &mut Channels, bias: f32);
    /// s0 += s1 + s2 + s3 + s4 + b
    fn mix5to1(ch: &mut Channels, bias: f32);
    /// c = s1 + b; s0 += c; s1 = s2 + c
    fn mix3to2(ch: &mut Channels, bias: f32);
    /// c = common + b; left += c; right += c
    fn mix21to2(left: &mut SubBlock, right: &mut SubBlock, common: &SubBlock, bias: f32);
    /// s0 += b - s2; s1 += b + s2
    fn mix21to_s(ch: &mut Channels, bias: f32);
    /// c = s1 + s3 + b; s0 += c; s1 = s2 + c
    fn mix31to2(ch: &mut Channels, bias: f32);
    /// c = s1 + b; s0 += c - s3; s1 = s2 + c + s3
    fn mix31to_s(ch: &mut Channels, bias: f32);
    /// s = s2 + s3; s0 += b - s; s1 += b + s
    fn mix22to_s(ch: &mut Channels, bias: f32);
    /// c = s1 + b; s0 += c + s3; s1 = c + s2 + s4
    fn mix32to2(ch: &mut Channels, bias: f32);
    /// c = s1 + b; s = s3 + s4; s0 += c - s; s1 = s2 + c + s
    fn mix32to_s(ch: &mut Channels, bias: f32);
    /// dest = a + b + bias
    fn move2to1(a: &SubBlock, b: &SubBlock, dest: &mut SubBlock, bias: f32);

    /// dest = src
    fn copy(dest: &mut SubBlock, src: &SubBlock) {
        dest.copy_from_slice(src);
    }

    /// dest = 0
    fn zero(dest: &mut SubBlock) {
        dest.fill(0.0);
    }
}

/// 把编码声道原地混合为输出声道.
///
/// `slev == 0` 时环绕声道不参与混合, 改用更少输入的原语.
/// 表中没有的组合 (包括相同模式) 不做任何操作.
pub fn downmix<K: MixKernel>(
    ch: &mut Channels,
    coded: ChannelMode,
    output: ChannelMode,
    bias: f32,
    slev: f32,
) {
    let no_surround = slev == 0.0;
    match (coded.coded(), output) {
        (Channel, Channel2) => {
            let [first, second, ..] = ch;
            K::copy(first, second);
        }

        (Channel, Mono) | (Stereo, Mono) => mix_front_pair::<K>(ch, bias),
        (F2R1, Mono) if no_surround => mix_front_pair::<K>(ch, bias),
        (F2R1, Mono) | (F3, Mono) => K::mix3to1(ch, bias),
        (F3R1, Mono) if no_surround => K::mix3to1(ch, bias),
        (F2R2, Mono) if no_surround => mix_front_pair::<K>(ch, bias),
        (F3R1, Mono) | (F2R2, Mono) => K::mix4to1(ch, bias),
        (F3R2, Mono) if no_surround => K::mix3to1(ch, bias),
        (F3R2, Mono) => K::mix5to1(ch, bias),

        (Mono, Dolby) => {
            let [center, right, ..] = ch;
            K::copy(right, center);
        }

        (F3, Stereo) | (F3, Dolby) => K::mix3to2(ch, bias),

        (F2R1, Stereo) => {
            if !no_surround {
                let [left, right, surround, ..] = ch;
                K::mix21to2(left, right, surround, bias);
            }
        }
        (F2R1, Dolby) => K::mix21to_s(ch, bias),

        (F3R1, Stereo) if no_surround => K::mix3to2(ch, bias),
        (F3R1, Stereo) => K::mix31to2(ch, bias),
        (F3R1, Dolby) => K::mix31to_s(ch, bias),

        (F2R2, Stereo) => {
            if !no_surround {
                let [left, right, ls, rs, _] = ch;
                K::mix2to1(left, ls, bias);
                K::mix2to1(right, rs, bias);
            }
        }
        (F2R2, Dolby) => K::mix22to_s(ch, bias),

        (F3R2, Stereo) if no_surround => K::mix3to2(ch, bias),
        (F3R2, Stereo) => K::mix32to2(ch, bias),
        (F3R2, Dolby) => K::mix32to_s(ch, bias),

        (F3R1, F3) => {
            if !no_surround {
                let [left, _, right, surround, _] = ch;
                K::mix21to2(left, right, surround, bias);
            }
        }
        (F3R2, F3) => {
            if !no_surround {
                let [left, _, right, ls, rs] = ch;
                K::mix2to1(left, ls, bias);
                K::mix2to1(right, rs, bias);
            }
        }

        (F3R1, F2R1) => {
            K::mix3to2(ch, bias);
            let [_, _, dest, surround, _] = ch;
            K::copy(dest, surround);
        }
        (F2R2, F2R1) => {
            let [_, _, ls, rs, _] = ch;
            K::mix2to1(ls, rs, bias);
        }
        (F3R2, F2R1) => {
            // 位置 2 改放两个环绕声道之和
            K::mix3to2(ch, bias);
            let [_, _, dest, ls, rs] = ch;
            K::move2to1(ls, rs, dest, bias);
        }
        (F3R2, F3R1) => {
            let [_, _, _, ls, rs] = ch;
            K::mix2to1(ls, rs, bias);
        }

        (F2R1, F2R2) => {
            let [_, _, surround, rs, _] = ch;
            K::copy(rs, surround);
        }
        (F3R1, F2R2) => {
            K::mix3to2(ch, bias);
            let [_, _, dest, surround, _] = ch;
            K::copy(dest, surround);
        }
        (F3R2, F2R2) => {
            K::mix3to2(ch, bias);
            let [_, _, s2, s3, s4] = ch;
            K::copy(s2, s3);
            K::copy(s3, s4);
        }
        (F3R1, F3R2) => {
            let [_, _, _, surround, rs] = ch;
            K::copy(rs, surround);
        }

        _ => {}
    }
}

/// 把已下混的延迟线展开回编码布局, 以便接下来做时域下混.
///
/// 被混掉的位置清零, 保留的声道移回编码位置.
pub fn upmix<K: MixKernel>(ch: &mut Channels, coded: ChannelMode, output: ChannelMode) {
    match (coded.coded(), output) {
        (Channel, Channel2) => {
            let [first, second, ..] = ch;
            K::copy(second, first);
        }

        (F3R2, Mono) => zero_from::<K>(ch, 1, 5),
        (F3R1, Mono) | (F2R2, Mono) => zero_from::<K>(ch, 1, 4),
        (F3, Mono) | (F2R1, Mono) => zero_from::<K>(ch, 1, 3),
        (Channel, Mono) | (Stereo, Mono) => zero_from::<K>(ch, 1, 2),

        (F3R2, Stereo) | (F3R2, Dolby) => {
            zero_from::<K>(ch, 3, 5);
            restore_right::<K>(ch);
        }
        (F3R1, Stereo) | (F3R1, Dolby) => {
            zero_from::<K>(ch, 3, 4);
            restore_right::<K>(ch);
        }
        (F3, Stereo) | (F3, Dolby) => restore_right::<K>(ch),

        (F2R2, Stereo) | (F2R2, Dolby) => zero_from::<K>(ch, 2, 4),
        (F2R1, Stereo) | (F2R1, Dolby) => zero_from::<K>(ch, 2, 3),

        (F3R2, F3) => zero_from::<K>(ch, 3, 5),
        (F3R1, F3) | (F2R2, F2R1) => zero_from::<K>(ch, 3, 4),
        (F3R2, F3R1) => zero_from::<K>(ch, 4, 5),

        (F3R2, F2R1) => {
            zero_from::<K>(ch, 4, 5);
            restore_center_surround::<K>(ch);
        }
        (F3R1, F2R1) => restore_center_surround::<K>(ch),
        (F3R2, F2R2) => {
            let [_, _, _, s3, s4] = ch;
            K::copy(s4, s3);
            restore_center_surround::<K>(ch);
        }

        _ => {}
    }
}

/// s0 += s1 + b
fn mix_front_pair<K: MixKernel>(ch: &mut Channels, bias: f32) {
    let [first, second, ..] = ch;
    K::mix2to1(first, second, bias);
}

/// 从高到低清零 [from, to) 声道
fn zero_from<K: MixKernel>(ch: &mut Channels, from: usize, to: usize) {
    for sub in ch[from..to].iter_mut().rev() {
        K::zero(sub);
    }
}

/// 右声道从位置 1 移回位置 2, 中置清零
fn restore_right<K: MixKernel>(ch: &mut Channels) {
    let [_, s1, s2, ..] = ch;
    K::copy(s2, s1);
    K::zero(s1);
}

/// 环绕从位置 2 移回 3, 再恢复右声道
fn restore_center_surround<K: MixKernel>(ch: &mut Channels) {
    let [_, _, s2, s3, _] = ch;
    K::copy(s3, s2);
    restore_right::<K>(ch);
}

/// 标量参考实现
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarMix;

impl MixKernel for ScalarMix {
    fn mix2to1(dest: &mut SubBlock, src: &SubBlock, bias: f32) {
        for (d, &s) in dest.iter_mut().zip(src.iter()) {
            *d += s + bias;
        }
    }

    fn mix3to1(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, ..] = ch;
        for i in 0..BLOCK_LEN {
            s0[i] += s1[i] + s2[i] + bias;
        }
    }

    fn mix4to1(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, _] = ch;
        for i in 0..BLOCK_LEN {
            s0[i] += s1[i] + s2[i] + s3[i] + bias;
        }
    }

    fn mix5to1(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, s4] = ch;
        for i in 0..BLOCK_LEN {
            s0[i] += s1[i] + s2[i] + s3[i] + s4[i] + bias;
        }
    }

    fn mix3to2(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, ..] = ch;
        for i in 0..BLOCK_LEN {
            let common = s1[i] + bias;
            s0[i] += common;
            s1[i] = s2[i] + common;
        }
    }

    fn mix21to2(left: &mut SubBlock, right: &mut SubBlock, common: &SubBlock, bias: f32) {
        for i in 0..BLOCK_LEN {
            let c = common[i] + bias;
            left[i] += c;
            right[i] += c;
        }
    }

    fn mix21to_s(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, ..] = ch;
        for i in 0..BLOCK_LEN {
            let surround = s2[i];
            s0[i] += bias - surround;
            s1[i] += bias + surround;
        }
    }

    fn mix31to2(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, _] = ch;
        for i in 0..BLOCK_LEN {
            let common = s1[i] + s3[i] + bias;
            s0[i] += common;
            s1[i] = s2[i] + common;
        }
    }

    fn mix31to_s(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, _] = ch;
        for i in 0..BLOCK_LEN {
            let common = s1[i] + bias;
            let surround = s3[i];
            s0[i] += common - surround;
            s1[i] = s2[i] + common + surround;
        }
    }

    fn mix22to_s(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, _] = ch;
        for i in 0..BLOCK_LEN {
            let surround = s2[i] + s3[i];
            s0[i] += bias - surround;
            s1[i] += bias + surround;
        }
    }

    fn mix32to2(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, s4] = ch;
        for i in 0..BLOCK_LEN {
            let common = s1[i] + bias;
            s0[i] += common + s3[i];
            s1[i] = common + s2[i] + s4[i];
        }
    }

    fn mix32to_s(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, s4] = ch;
        for i in 0..BLOCK_LEN {
            let common = s1[i] + bias;
            let surround = s3[i] + s4[i];
            s0[i] += common - surround;
            s1[i] = s2[i] + common + surround;
        }
    }

    fn move2to1(a: &SubBlock, b: &SubBlock, dest: &mut SubBlock, bias: f32) {
        for i in 0..BLOCK_LEN {
            dest[i] = a[i] + b[i] + bias;
        }
    }
}
