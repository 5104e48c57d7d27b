//! A/52 声道矩阵.
//!
//! 把编码声道布局 (单声道 .. 3F/2R) 映射到请求的输出布局:
//! - [`select_output`]: 解析实际输出模式并做电平补偿
//! - [`mix_coefficients`]: 各编码声道在变换前的增益
//! - [`downmix`] / [`upmix`]: 原地相加/展开

pub mod coeff;
pub mod mix;
pub mod select;


pub use coeff::{MixCoefficients, mix_coefficients};
pub use mix::{Channels, MixKernel, ScalarMix, downmix, upmix};
pub use select::{OutputSelection, select_output};
