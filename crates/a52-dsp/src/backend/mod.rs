//! 合成后端选择.
//!
//! 变换与混音的入口在上下文创建时绑定到某一实现, 之后不再改变.
//! 各实现的输出逐位一致, 只是内层循环的组织方式不同.

mod lanes;
mod scalar;


use std::fmt;
use std::str::FromStr;

use a52_core::{A52Error, ChannelMode, CpuCaps};
use serde::{Deserialize, Serialize};

use crate::block::SubBlock;
use crate::downmix::Channels;
use crate::imdct::ImdctTables;

pub use lanes::LanesBackend;
pub use scalar::ScalarBackend;

/// 合成后端: IMDCT 与声道矩阵的一组实现
pub trait SynthBackend: Send + Sync + fmt::Debug {
    /// 后端名称
    fn name(&self) -> &'static str;

    /// 长块 IMDCT
    fn imdct_512(&self, tables: &ImdctTables, data: &mut SubBlock, delay: &mut SubBlock, bias: f32);

    /// 短块 IMDCT (两个 128 点变换)
    fn imdct_256(&self, tables: &ImdctTables, data: &mut SubBlock, delay: &mut SubBlock, bias: f32);

    /// 原地下混
    fn downmix(
        &self,
        channels: &mut Channels,
        coded: ChannelMode,
        output: ChannelMode,
        bias: f32,
        slev: f32,
    );

    /// 原地上混 (展开已下混的延迟线)
    fn upmix(&self, channels: &mut Channels, coded: ChannelMode, output: ChannelMode);
}

/// 后端偏好
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// 按 CPU 能力自动选择
    #[default]
    Auto,
    /// 标量参考实现
    Scalar,
    /// 分道实现
    Lanes,
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Scalar => "scalar",
            Self::Lanes => "lanes",
        };
        f.write_str(name)
    }
}

impl FromStr for BackendPreference {
    type Err = A52Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "scalar" => Ok(Self::Scalar),
            "lanes" => Ok(Self::Lanes),
            _ => Err(A52Error::InvalidConfig(format!("未知后端: {s}"))),
        }
    }
}

static SCALAR: ScalarBackend = ScalarBackend;
static LANES: LanesBackend = LanesBackend;

/// 按偏好与 CPU 能力选择后端
pub fn select_backend(preference: BackendPreference, caps: CpuCaps) -> &'static dyn SynthBackend {
    let backend: &'static dyn SynthBackend = match preference {
        BackendPreference::Scalar => &SCALAR,
        BackendPreference::Lanes => &LANES,
        BackendPreference::Auto if caps.has_vector_unit() => &LANES,
        BackendPreference::Auto => &SCALAR,
    };
    log::info!(
        "合成后端: {} (偏好={preference}, CPU={caps:?})",
        backend.name()
    );
    backend
}
