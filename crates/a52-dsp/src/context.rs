//! 合成上下文.
//!
//! 把 IMDCT、声道矩阵和量化器串成每块的合成流程, 并持有跨块状态:
//! 各声道的延迟线、延迟线当前是否处于下混布局、当前帧的输出设置和统计.
//!
//! 流程:
//! 1. 每帧开始调用 `configure_frame()` 解析输出模式与混音增益
//! 2. 每块调用 `process_block()` 得到交错 PCM
//! 3. seek 之后调用 `reset()` 清空延迟线

use std::fmt;

use a52_core::{A52Error, A52Result, ChannelMode, CpuCaps};

use crate::backend::{SynthBackend, select_backend};
use crate::block::{CodedBlock, SampleBlock, SubBlock};
use crate::config::SynthConfig;
use crate::downmix::{MixCoefficients, mix_coefficients, select_output};
use crate::imdct::ImdctTables;
use crate::quantize::{OutputLayout, Quantizer, quantize_interleave};

/// 帧头中与合成相关的字段
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// 编码声道模式 (Dolby Surround 编码的立体声记为 `Dolby`)
    pub mode: ChannelMode,
    /// 码流是否带 LFE
    pub lfe: bool,
    /// 中置混音电平
    pub clev: f32,
    /// 环绕混音电平
    pub slev: f32,
}

impl FrameInfo {
    /// 使用缺省混音电平 (-3dB) 的帧信息
    pub fn new(mode: ChannelMode, lfe: bool) -> Self {
        Self {
            mode,
            lfe,
            clev: a52_core::levels::LEVEL_3DB,
            slev: a52_core::levels::LEVEL_3DB,
        }
    }
}

/// 一帧的输出设置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSetup {
    /// 实际输出模式
    pub output: ChannelMode,
    /// 是否输出 LFE
    pub lfe: bool,
    /// 补偿后的输出电平
    pub level: f32,
    /// 各编码声道增益
    pub coefficients: MixCoefficients,
    /// 交错布局
    pub layout: OutputLayout,
}

/// 累计统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthStats {
    /// 已合成的块数
    pub blocks: u64,
    /// 已输出的 PCM 样本数 (含所有声道)
    pub samples: u64,
    /// 削波样本数
    pub clipped: u64,
}

#[derive(Clone, Copy)]
struct ActiveFrame {
    info: FrameInfo,
    setup: FrameSetup,
}

/// A/52 合成上下文
pub struct SynthContext {
    backend: &'static dyn SynthBackend,
    tables: &'static ImdctTables,
    config: SynthConfig,
    quantizer: Quantizer,
    samples: Box<SampleBlock>,
    delay: Box<SampleBlock>,
    /// 延迟线是否已按当前输出模式下混
    downmixed: bool,
    frame: Option<ActiveFrame>,
    stats: SynthStats,
}

impl fmt::Debug for SynthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthContext")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .field("downmixed", &self.downmixed)
            .field("setup", &self.frame.map(|fr| fr.setup))
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl SynthContext {
    /// 按配置创建上下文, 后端由偏好和 CPU 能力决定
    pub fn new(config: SynthConfig) -> A52Result<Self> {
        config.validate()?;
        let backend = select_backend(config.backend, CpuCaps::detect());
        Self::with_backend(config, backend)
    }

    /// 使用指定后端创建上下文
    pub fn with_backend(config: SynthConfig, backend: &'static dyn SynthBackend) -> A52Result<Self> {
        config.validate()?;
        log::debug!(
            "创建合成上下文: 输出={}, lfe={}, 后端={}",
            config.output,
            config.lfe,
            backend.name()
        );
        Ok(Self {
            backend,
            tables: ImdctTables::global(),
            config,
            quantizer: config.quantizer(),
            samples: Box::default(),
            delay: Box::default(),
            downmixed: false,
            frame: None,
            stats: SynthStats::default(),
        })
    }

    /// 后端名称
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// 当前配置
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// 当前帧的输出设置, 尚未配置帧时为 `None`
    pub fn frame_setup(&self) -> Option<&FrameSetup> {
        self.frame.as_ref().map(|fr| &fr.setup)
    }

    /// 累计统计
    pub fn stats(&self) -> SynthStats {
        self.stats
    }

    /// 清空延迟线与下混状态, 保留当前帧设置与统计
    pub fn reset(&mut self) {
        *self.delay = SampleBlock::new();
        self.downmixed = false;
    }

    /// 按帧头配置输出.
    ///
    /// # 参数
    /// - `info`: 帧头中的声道模式、LFE 与混音电平
    ///
    /// # 返回
    /// - `Ok(setup)`: 本帧的输出模式、增益与交错布局
    /// - `Err(..)`: 编码模式无效, 或输出模式没有交错布局
    ///
    /// 编码模式、输出模式或 LFE 输出与上一帧不同时, 延迟线按新布局重新开始.
    pub fn configure_frame(&mut self, info: &FrameInfo) -> A52Result<FrameSetup> {
        let request = self.config.request();
        let selection = select_output(info.mode, &request, self.config.level, info.clev, info.slev)?;
        let coefficients = mix_coefficients(
            info.mode,
            selection.mode,
            selection.level,
            info.clev,
            info.slev,
        )?;
        let lfe = info.lfe && request.lfe;
        let layout = OutputLayout::for_mode(selection.mode, lfe)?;

        let setup = FrameSetup {
            output: selection.mode,
            lfe,
            level: selection.level,
            coefficients,
            layout,
        };

        if let Some(prev) = self.frame {
            if prev.info.mode != info.mode
                || prev.setup.output != setup.output
                || prev.setup.lfe != setup.lfe
            {
                log::debug!(
                    "声道配置变化 {}->{} (lfe={}) 变为 {}->{} (lfe={}), 重置延迟线",
                    prev.info.mode,
                    prev.setup.output,
                    prev.setup.lfe,
                    info.mode,
                    setup.output,
                    setup.lfe
                );
                self.reset();
            }
        }

        log::debug!(
            "帧配置: {} -> {}, lfe={}, 电平={:.4}, 交错声道数={}",
            info.mode,
            setup.output,
            lfe,
            setup.level,
            layout.channels()
        );
        self.frame = Some(ActiveFrame { info: *info, setup });
        Ok(setup)
    }

    /// 合成一块, 返回交错 PCM
    pub fn process_block(&mut self, block: &CodedBlock) -> A52Result<Vec<i16>> {
        let setup = self.current_frame()?.setup;
        let mut out = vec![0i16; setup.layout.samples_per_block()];
        self.process_block_into(block, &mut out)?;
        Ok(out)
    }

    /// 合成一块写入 `out`, 返回本块削波样本数.
    ///
    /// `out` 长度必须等于当前布局的 `samples_per_block()`.
    pub fn process_block_into(&mut self, block: &CodedBlock, out: &mut [i16]) -> A52Result<usize> {
        let frame = self.current_frame()?;
        let layout = &frame.setup.layout;
        if out.len() != layout.samples_per_block() {
            return Err(A52Error::InvalidArgument(format!(
                "交错输出长度应为 {}, 实际为 {}",
                layout.samples_per_block(),
                out.len()
            )));
        }

        let uniform = block.uniform_block_switch(frame.info.mode.channels());
        self.render(block, &frame, uniform);

        let clipped = quantize_interleave(&self.samples, layout, &self.quantizer, out)?;
        self.stats.blocks += 1;
        self.stats.samples += out.len() as u64;
        self.stats.clipped += clipped as u64;
        Ok(clipped)
    }

    /// 把一块系数合成为带偏置的时域样本, 结果留在 `self.samples`.
    ///
    /// `uniform` 为真时在频域下混, 否则在时域下混.
    fn render(&mut self, block: &CodedBlock, frame: &ActiveFrame, uniform: bool) {
        let ActiveFrame { info, setup } = frame;
        let (coded, output) = (info.mode, setup.output);
        let inputs = coded.channels();
        let outputs = output.channels();
        let bias = self.config.bias;
        let backend = self.backend;
        let tables = self.tables;
        let gains = &setup.coefficients.gains;

        let samples = &mut self.samples.channels;
        let delay = &mut self.delay.channels;

        for (n, (dst, src)) in samples.iter_mut().zip(block.coeffs.iter()).take(inputs).enumerate() {
            let gain = gains[n];
            for (d, &c) in dst.iter_mut().zip(src.iter()) {
                *d = c * gain;
            }
        }

        if uniform {
            // 频域下混, 只变换输出声道
            backend.downmix(samples, coded, output, 0.0, info.slev);
            if !self.downmixed {
                backend.downmix(delay, coded, output, 0.0, info.slev);
                self.downmixed = true;
            }
            let short = block.block_switch[0];
            for (data, history) in samples.iter_mut().zip(delay.iter_mut()).take(outputs) {
                transform(backend, tables, short, data, history, bias);
            }
        } else {
            if self.downmixed {
                backend.upmix(delay, coded, output);
                self.downmixed = false;
            }
            let channels = samples.iter_mut().zip(delay.iter_mut());
            for (n, (data, history)) in channels.take(inputs).enumerate() {
                transform(backend, tables, block.block_switch[n], data, history, 0.0);
            }
            backend.downmix(samples, coded, output, 0.0, info.slev);
            for sub in samples.iter_mut().take(outputs) {
                for s in sub.iter_mut() {
                    *s += bias;
                }
            }
        }

        if setup.lfe {
            let lfe = &mut self.samples.lfe;
            for (d, &c) in lfe.iter_mut().zip(block.lfe.iter()) {
                *d = c * setup.level;
            }
            backend.imdct_512(tables, lfe, &mut self.delay.lfe, bias);
        }
    }

    fn current_frame(&self) -> A52Result<ActiveFrame> {
        self.frame
            .ok_or_else(|| A52Error::InvalidArgument("尚未调用 configure_frame".into()))
    }
}

fn transform(
    backend: &dyn SynthBackend,
    tables: &ImdctTables,
    short: bool,
    data: &mut SubBlock,
    delay: &mut SubBlock,
    bias: f32,
) {
    if short {
        backend.imdct_256(tables, data, delay, bias);
    } else {
        backend.imdct_512(tables, data, delay, bias);
    }
}
