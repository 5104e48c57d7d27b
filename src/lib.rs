//! # a52
//!
//! 纯 Rust 实现的 ATSC A/52 (AC-3) 解码合成后端.
//!
//! 上游解析与反量化得到每块 256 个频域系数后, 由本库完成:
//! - **IMDCT**: 长/短块变换, KBD 窗叠加
//! - **声道矩阵**: 下混到请求的输出布局, 可选电平补偿
//! - **量化交错**: 输出交错的 16 位 PCM
//!
//! # 快速开始
//!
//! ```rust
//! use a52::core::ChannelMode;
//! use a52::dsp::{CodedBlock, FrameInfo, SynthConfig, SynthContext};
//!
//! let config = SynthConfig {
//!     output: ChannelMode::Stereo,
//!     adjust_level: true,
//!     ..SynthConfig::default()
//! };
//! let mut ctx = SynthContext::new(config).unwrap();
//! let setup = ctx
//!     .configure_frame(&FrameInfo::new(ChannelMode::ThreeFrontTwoRear, true))
//!     .unwrap();
//! let pcm = ctx.process_block(&CodedBlock::new()).unwrap();
//! assert_eq!(pcm.len(), 256 * setup.layout.channels());
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `a52-core` | 声道模式、混音电平、布局、错误类型 |
//! | `a52-dsp` | IMDCT、声道矩阵、量化交错、后端与合成上下文 |

pub mod logging;

/// 核心类型
pub use a52_core as core;

/// 合成 DSP
pub use a52_dsp as dsp;

/// 获取版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
