//! # a52-dsp
//!
//! A/52 (AC-3) 解码的合成后端: 把反量化后的频域系数变成交错的 16 位 PCM.
//!
//! - **IMDCT**: 256 系数到 512 样本的长块变换与两个 128 点的短块变换, KBD 窗叠加
//! - **声道矩阵**: 任意编码布局到请求输出布局的原地下混/上混, 以及电平补偿
//! - **量化交错**: 去偏置、饱和到 i16, 按 L, R, Ls, Rs, C, LFE 顺序交错
//!
//! 变换和矩阵由 [`SynthBackend`] 实现, 标量与分道两个后端输出逐位一致.
//!
//! ## 使用示例
//!
//! ```rust
//! use a52_core::ChannelMode;
//! use a52_dsp::{CodedBlock, FrameInfo, SynthConfig, SynthContext};
//!
//! let mut ctx = SynthContext::new(SynthConfig::default()).unwrap();
//! ctx.configure_frame(&FrameInfo::new(ChannelMode::ThreeFrontTwoRear, true))
//!     .unwrap();
//! let pcm = ctx.process_block(&CodedBlock::new()).unwrap();
//! assert_eq!(pcm.len(), 2 * 256);
//! ```

pub mod backend;
pub mod block;
pub mod config;
pub mod context;
pub mod downmix;
pub mod imdct;
pub mod quantize;

// 重导出常用类型
pub use backend::{BackendPreference, LanesBackend, ScalarBackend, SynthBackend, select_backend};
pub use block::{BLOCK_LEN, CodedBlock, MAX_CHANNELS, SampleBlock, SubBlock};
pub use config::SynthConfig;
pub use context::{FrameInfo, FrameSetup, SynthContext, SynthStats};
pub use downmix::{MixCoefficients, OutputSelection, mix_coefficients, select_output};
pub use imdct::ImdctTables;
pub use quantize::{OutputLayout, Quantizer, Slot, quantize_interleave};
