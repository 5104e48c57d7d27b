//! 交错输出的扬声器布局.
//!
//! 交错 PCM 的槽位顺序固定为 L, R, Ls, Rs, C, LFE (截取前 N 个),
//! 布局掩码描述的是这些槽位对应的扬声器位置, 与槽位里是否真有信号无关.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// 声道位掩码, 每个位代表一个扬声器位置
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChannelMask: u32 {
        /// 前方左声道
        const FRONT_LEFT     = 1 << 0;
        /// 前方右声道
        const FRONT_RIGHT    = 1 << 1;
        /// 前方中央声道
        const FRONT_CENTER   = 1 << 2;
        /// 低频效果 (LFE)
        const LOW_FREQUENCY  = 1 << 3;
        /// 后方左声道
        const BACK_LEFT      = 1 << 4;
        /// 后方右声道
        const BACK_RIGHT     = 1 << 5;
    }
}

/// 声道布局
///
/// 描述交错输出中声道的数量和扬声器位置.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelLayout {
    /// 声道数量
    pub channels: u32,
    /// 声道位掩码
    pub mask: ChannelMask,
}

impl ChannelLayout {
    /// 单声道
    pub const MONO: Self = Self::from_mask(ChannelMask::FRONT_CENTER);

    /// 立体声 (左右)
    pub const STEREO: Self =
        Self::from_mask(ChannelMask::FRONT_LEFT.union(ChannelMask::FRONT_RIGHT));

    /// 四声道 (前左右 + 后左右)
    pub const QUAD: Self = Self::from_mask(
        ChannelMask::FRONT_LEFT
            .union(ChannelMask::FRONT_RIGHT)
            .union(ChannelMask::BACK_LEFT)
            .union(ChannelMask::BACK_RIGHT),
    );

    /// 5.0 环绕声
    pub const SURROUND_5_0: Self = Self::from_mask(
        ChannelMask::FRONT_LEFT
            .union(ChannelMask::FRONT_RIGHT)
            .union(ChannelMask::FRONT_CENTER)
            .union(ChannelMask::BACK_LEFT)
            .union(ChannelMask::BACK_RIGHT),
    );

    /// 5.1 环绕声
    pub const SURROUND_5_1: Self = Self::from_mask(
        ChannelMask::FRONT_LEFT
            .union(ChannelMask::FRONT_RIGHT)
            .union(ChannelMask::FRONT_CENTER)
            .union(ChannelMask::LOW_FREQUENCY)
            .union(ChannelMask::BACK_LEFT)
            .union(ChannelMask::BACK_RIGHT),
    );

    /// 由位掩码创建布局, 声道数等于置位个数
    pub const fn from_mask(mask: ChannelMask) -> Self {
        Self {
            channels: mask.bits().count_ones(),
            mask,
        }
    }

    /// 是否含 LFE
    pub const fn has_lfe(&self) -> bool {
        self.mask.contains(ChannelMask::LOW_FREQUENCY)
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::MONO => write!(f, "mono"),
            Self::STEREO => write!(f, "stereo"),
            Self::QUAD => write!(f, "quad"),
            Self::SURROUND_5_0 => write!(f, "5.0"),
            Self::SURROUND_5_1 => write!(f, "5.1"),
            _ => write!(f, "{}ch", self.channels),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_channel_counts() {
        assert_eq!(ChannelLayout::MONO.channels, 1);
        assert_eq!(ChannelLayout::STEREO.channels, 2);
        assert_eq!(ChannelLayout::QUAD.channels, 4);
        assert_eq!(ChannelLayout::SURROUND_5_1.channels, 6);
        assert!(ChannelLayout::SURROUND_5_1.has_lfe());
        assert!(!ChannelLayout::SURROUND_5_0.has_lfe());
    }

    #[test]
    fn test_layout_display() {
        assert_eq!(ChannelLayout::SURROUND_5_1.to_string(), "5.1");
        let custom = ChannelLayout::from_mask(
            ChannelMask::FRONT_LEFT
                .union(ChannelMask::FRONT_RIGHT)
                .union(ChannelMask::LOW_FREQUENCY),
        );
        assert_eq!(custom.to_string(), "3ch");
    }
}
