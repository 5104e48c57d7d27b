//! # a52-core
//!
//! A/52 合成后端核心库, 提供声道模式, 混音电平, 输出布局和错误类型.
//!
//! 本 crate 不含任何 DSP 计算, 供 `a52-dsp` 与上层解码器共享基础类型.

pub mod channel_layout;
pub mod channel_mode;
pub mod cpu;
pub mod error;
pub mod levels;

// 重导出常用类型
pub use channel_layout::{ChannelLayout, ChannelMask};
pub use channel_mode::{CHANNEL_MASK, ChannelMode, OutputFlags, OutputRequest};
pub use cpu::CpuCaps;
pub use error::{A52Error, A52Result};
