//! 统一错误类型定义.
//!
//! 合成后端的错误面很窄: 只有输出请求与声道模式组合相关的错误是可恢复的.
//! 削波只做计数, 不是错误.

use thiserror::Error;

use crate::channel_mode::ChannelMode;

/// A/52 合成后端统一错误类型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum A52Error {
    /// 请求的输出模式超出枚举范围
    #[error("无效的输出模式: {0}")]
    InvalidOutputMode(u32),

    /// 无效的编码声道模式
    #[error("无效的编码声道模式: {0}")]
    InvalidCodedMode(u32),

    /// 下混表中不存在的 (编码模式, 输出模式) 组合
    #[error("不支持的声道转换: {coded} -> {output}")]
    UnsupportedConversion {
        /// 编码声道模式
        coded: ChannelMode,
        /// 输出声道模式
        output: ChannelMode,
    },

    /// 没有对应交错排列的输出模式
    #[error("不支持的交错输出布局: {mode} (lfe={lfe})")]
    UnsupportedLayout {
        /// 输出声道模式
        mode: ChannelMode,
        /// 是否带 LFE
        lfe: bool,
    },

    /// 无效配置
    #[error("无效配置: {0}")]
    InvalidConfig(String),

    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),
}

/// A/52 合成后端统一 Result 类型
pub type A52Result<T> = Result<T, A52Error>;
