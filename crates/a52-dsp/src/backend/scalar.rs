//! 标量参考后端.

use a52_core::ChannelMode;

use super::SynthBackend;
use crate::block::SubBlock;
use crate::downmix::{self, Channels, ScalarMix};
use crate::imdct::{self, ImdctTables};

/// 逐样本循环的参考实现
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarBackend;

impl SynthBackend for ScalarBackend {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn imdct_512(&self, tables: &ImdctTables, data: &mut SubBlock, delay: &mut SubBlock, bias: f32) {
        imdct::imdct_512(tables, data, delay, bias);
    }

    fn imdct_256(&self, tables: &ImdctTables, data: &mut SubBlock, delay: &mut SubBlock, bias: f32) {
        imdct::imdct_256(tables, data, delay, bias);
    }

    fn downmix(
        &self,
        channels: &mut Channels,
        coded: ChannelMode,
        output: ChannelMode,
        bias: f32,
        slev: f32,
    ) {
        downmix::downmix::<ScalarMix>(channels, coded, output, bias, slev);
    }

    fn upmix(&self, channels: &mut Channels, coded: ChannelMode, output: ChannelMode) {
        downmix::upmix::<ScalarMix>(channels, coded, output);
    }
}
