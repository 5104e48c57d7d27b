//! A/52 合成后端性能基准测试.
//!
//! 覆盖两种后端的长/短块 IMDCT、3F2R 下混和完整的每块合成路径.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use a52::core::ChannelMode;
use a52::dsp::downmix::Channels;
use a52::dsp::{
    BLOCK_LEN, CodedBlock, FrameInfo, ImdctTables, LanesBackend, MAX_CHANNELS, ScalarBackend,
    SubBlock, SynthBackend, SynthConfig, SynthContext,
};

static SCALAR: ScalarBackend = ScalarBackend;
static LANES: LanesBackend = LanesBackend;

fn backends() -> [&'static dyn SynthBackend; 2] {
    [&SCALAR, &LANES]
}

/// 生成确定性的系数块
fn make_coeffs(seed: u32) -> SubBlock {
    let mut state = seed;
    let mut out = [0.0f32; BLOCK_LEN];
    for v in out.iter_mut() {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        *v = ((state >> 8) as f32 / (1u32 << 24) as f32 - 0.5) * 0.1;
    }
    out
}

fn bench_imdct(c: &mut Criterion) {
    let tables = ImdctTables::global();
    for backend in backends() {
        let coeffs = make_coeffs(1);
        c.bench_function(&format!("imdct_512_{}", backend.name()), |b| {
            let mut delay = [0.0f32; BLOCK_LEN];
            b.iter(|| {
                let mut data = coeffs;
                backend.imdct_512(tables, &mut data, &mut delay, 384.0);
                black_box(&data);
            });
        });
        c.bench_function(&format!("imdct_256_{}", backend.name()), |b| {
            let mut delay = [0.0f32; BLOCK_LEN];
            b.iter(|| {
                let mut data = coeffs;
                backend.imdct_256(tables, &mut data, &mut delay, 384.0);
                black_box(&data);
            });
        });
    }
}

fn bench_downmix(c: &mut Criterion) {
    let mut input: Channels = [[0.0f32; BLOCK_LEN]; MAX_CHANNELS];
    for (n, ch) in input.iter_mut().enumerate() {
        *ch = make_coeffs(n as u32 + 10);
    }
    for backend in backends() {
        c.bench_function(&format!("downmix_3f2r_stereo_{}", backend.name()), |b| {
            b.iter(|| {
                let mut ch = input;
                backend.downmix(
                    &mut ch,
                    ChannelMode::ThreeFrontTwoRear,
                    ChannelMode::Stereo,
                    384.0,
                    0.707,
                );
                black_box(&ch);
            });
        });
    }
}

fn bench_process_block(c: &mut Criterion) {
    let mut block = CodedBlock::new();
    for (n, ch) in block.coeffs.iter_mut().enumerate() {
        *ch = make_coeffs(n as u32 + 20);
    }
    block.lfe = make_coeffs(30);

    for backend in backends() {
        c.bench_function(&format!("process_block_3f2r_stereo_{}", backend.name()), |b| {
            let config = SynthConfig {
                adjust_level: true,
                ..SynthConfig::default()
            };
            let mut ctx = SynthContext::with_backend(config, backend).unwrap();
            ctx.configure_frame(&FrameInfo::new(ChannelMode::ThreeFrontTwoRear, true))
                .unwrap();
            b.iter(|| {
                let pcm = ctx.process_block(black_box(&block)).unwrap();
                black_box(pcm);
            });
        });
    }
}

criterion_group!(benches, bench_imdct, bench_downmix, bench_process_block);
criterion_main!(benches);
