//! A/52 声道模式与输出请求.
//!
//! 编码声道模式即码流中的 acmod (0..=7), 另有三个只作为输出请求出现的模式:
//! `Channel1` / `Channel2` (双单声道中只取一路) 与 `Dolby` (Dolby Surround 兼容立体声).
//! 数值即输出标志字的低 4 位, 可与 LFE/电平补偿标志按位或后整体传递.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{A52Error, A52Result};

/// 声道模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChannelMode {
    /// 双单声道 (两路独立声道, 1+1)
    #[serde(rename = "channel")]
    Channel = 0,
    /// 单声道 (1/0)
    #[serde(rename = "mono")]
    Mono = 1,
    /// 立体声 (2/0)
    #[serde(rename = "stereo")]
    Stereo = 2,
    /// 三前置 (3/0): L, C, R
    #[serde(rename = "3f")]
    ThreeFront = 3,
    /// 两前一后 (2/1): L, R, S
    #[serde(rename = "2f+1r")]
    TwoFrontOneRear = 4,
    /// 三前一后 (3/1): L, C, R, S
    #[serde(rename = "3f+1r")]
    ThreeFrontOneRear = 5,
    /// 两前两后 (2/2): L, R, Ls, Rs
    #[serde(rename = "2f+2r")]
    TwoFrontTwoRear = 6,
    /// 三前两后 (3/2): L, C, R, Ls, Rs
    #[serde(rename = "3f+2r")]
    ThreeFrontTwoRear = 7,
    /// 双单声道只取第一路
    #[serde(rename = "channel1")]
    Channel1 = 8,
    /// 双单声道只取第二路
    #[serde(rename = "channel2")]
    Channel2 = 9,
    /// Dolby Surround 兼容立体声
    #[serde(rename = "dolby")]
    Dolby = 10,
}

impl ChannelMode {
    /// 全部模式, 按数值排列
    pub const ALL: [ChannelMode; 11] = [
        Self::Channel,
        Self::Mono,
        Self::Stereo,
        Self::ThreeFront,
        Self::TwoFrontOneRear,
        Self::ThreeFrontOneRear,
        Self::TwoFrontTwoRear,
        Self::ThreeFrontTwoRear,
        Self::Channel1,
        Self::Channel2,
        Self::Dolby,
    ];

    /// 从数值构造, 超出范围返回 `None`
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Channel),
            1 => Some(Self::Mono),
            2 => Some(Self::Stereo),
            3 => Some(Self::ThreeFront),
            4 => Some(Self::TwoFrontOneRear),
            5 => Some(Self::ThreeFrontOneRear),
            6 => Some(Self::TwoFrontTwoRear),
            7 => Some(Self::ThreeFrontTwoRear),
            8 => Some(Self::Channel1),
            9 => Some(Self::Channel2),
            10 => Some(Self::Dolby),
            _ => None,
        }
    }

    /// 从码流 acmod (3 位) 构造编码模式
    pub const fn from_acmod(acmod: u8) -> Self {
        match Self::from_u8(acmod & 7) {
            Some(mode) => mode,
            None => Self::Channel,
        }
    }

    /// 数值
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// 对应的 acmod 编号 (低 3 位). `Dolby` 按立体声处理.
    pub const fn acmod(self) -> u8 {
        (self as u8) & 7
    }

    /// 归一化到 acmod 模式 (去掉 Channel1/Channel2/Dolby 这些输出专用别名)
    pub const fn coded(self) -> Self {
        Self::from_acmod(self.acmod())
    }

    /// 该模式下的全带宽声道数 (不含 LFE)
    pub const fn channels(self) -> usize {
        match self {
            Self::Channel => 2,
            Self::Mono => 1,
            Self::Stereo => 2,
            Self::ThreeFront => 3,
            Self::TwoFrontOneRear => 3,
            Self::ThreeFrontOneRear => 4,
            Self::TwoFrontTwoRear => 4,
            Self::ThreeFrontTwoRear => 5,
            Self::Channel1 => 1,
            Self::Channel2 => 1,
            Self::Dolby => 2,
        }
    }

    /// 模式名 (与常见播放器日志保持一致)
    pub const fn name(self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Mono => "mono",
            Self::Stereo => "stereo",
            Self::ThreeFront => "3f",
            Self::TwoFrontOneRear => "2f+1r",
            Self::ThreeFrontOneRear => "3f+1r",
            Self::TwoFrontTwoRear => "2f+2r",
            Self::ThreeFrontTwoRear => "3f+2r",
            Self::Channel1 => "channel1",
            Self::Channel2 => "channel2",
            Self::Dolby => "dolby",
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChannelMode {
    type Err = A52Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| A52Error::InvalidConfig(format!("未知声道模式: {s}")))
    }
}

bitflags! {
    /// 输出请求中可与模式值按位或的附加标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OutputFlags: u32 {
        /// 输出 LFE 声道 (仅当码流带 LFE 时生效)
        const LFE          = 0x10;
        /// 自动补偿下混后的输出电平
        const ADJUST_LEVEL = 0x20;
    }
}

/// 低 4 位为模式值
pub const CHANNEL_MASK: u32 = 0x0f;

/// 调用方的输出请求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputRequest {
    /// 期望的输出声道模式
    pub mode: ChannelMode,
    /// 是否输出 LFE
    #[serde(default)]
    pub lfe: bool,
    /// 是否自动补偿输出电平
    #[serde(default)]
    pub adjust_level: bool,
}

impl OutputRequest {
    /// 不带附加标志的请求
    pub const fn new(mode: ChannelMode) -> Self {
        Self {
            mode,
            lfe: false,
            adjust_level: false,
        }
    }

    /// 设置 LFE 输出
    pub const fn with_lfe(mut self, lfe: bool) -> Self {
        self.lfe = lfe;
        self
    }

    /// 设置电平自动补偿
    pub const fn with_adjust_level(mut self, adjust: bool) -> Self {
        self.adjust_level = adjust;
        self
    }

    /// 解析原始标志字 (`mode | LFE | ADJUST_LEVEL`)
    pub fn from_flags(flags: u32) -> A52Result<Self> {
        let value = flags & CHANNEL_MASK;
        let mode = u8::try_from(value)
            .ok()
            .and_then(ChannelMode::from_u8)
            .ok_or(A52Error::InvalidOutputMode(value))?;
        let extra = OutputFlags::from_bits_truncate(flags);
        Ok(Self {
            mode,
            lfe: extra.contains(OutputFlags::LFE),
            adjust_level: extra.contains(OutputFlags::ADJUST_LEVEL),
        })
    }

    /// 编码为原始标志字
    pub fn to_flags(&self) -> u32 {
        let mut extra = OutputFlags::empty();
        extra.set(OutputFlags::LFE, self.lfe);
        extra.set(OutputFlags::ADJUST_LEVEL, self.adjust_level);
        u32::from(self.mode.as_u8()) | extra.bits()
    }
}

impl Default for OutputRequest {
    fn default() -> Self {
        Self::new(ChannelMode::Stereo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_roundtrip_values() {
        for mode in ChannelMode::ALL {
            assert_eq!(ChannelMode::from_u8(mode.as_u8()), Some(mode));
        }
        assert_eq!(ChannelMode::from_u8(11), None);
    }

    #[test]
    fn test_dolby_is_stereo_acmod() {
        assert_eq!(ChannelMode::Dolby.acmod(), 2);
        assert_eq!(ChannelMode::Dolby.coded(), ChannelMode::Stereo);
        assert_eq!(ChannelMode::Channel2.coded(), ChannelMode::Mono);
    }

    #[test]
    fn test_channel_counts() {
        assert_eq!(ChannelMode::Channel.channels(), 2);
        assert_eq!(ChannelMode::ThreeFrontTwoRear.channels(), 5);
        assert_eq!(ChannelMode::Channel1.channels(), 1);
        assert_eq!(ChannelMode::Dolby.channels(), 2);
    }

    #[test]
    fn test_output_request_flags() {
        let req = OutputRequest::from_flags(0x02 | 0x10 | 0x20).unwrap();
        assert_eq!(req.mode, ChannelMode::Stereo);
        assert!(req.lfe);
        assert!(req.adjust_level);
        assert_eq!(req.to_flags(), 0x32);
    }

    #[test]
    fn test_output_request_out_of_range() {
        assert_eq!(
            OutputRequest::from_flags(11),
            Err(A52Error::InvalidOutputMode(11))
        );
        assert_eq!(
            OutputRequest::from_flags(0x0f | 0x20),
            Err(A52Error::InvalidOutputMode(15))
        );
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("3f+2r".parse::<ChannelMode>(), Ok(ChannelMode::ThreeFrontTwoRear));
        assert_eq!("Dolby".parse::<ChannelMode>(), Ok(ChannelMode::Dolby));
        assert!("7.1".parse::<ChannelMode>().is_err());
    }

    #[test]
    fn test_output_request_deserialize() {
        let req: OutputRequest =
            serde_json::from_str(r#"{"mode":"3f+2r","lfe":true}"#).unwrap();
        assert_eq!(req.mode, ChannelMode::ThreeFrontTwoRear);
        assert!(req.lfe);
        assert!(!req.adjust_level);
    }
}
