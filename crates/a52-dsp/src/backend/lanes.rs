//! 分道后端.
//!
//! 先把按置换/翻转顺序访问的数据收集到连续数组, 再以 8 个样本为一组做逐元素运算,
//! 便于编译器生成向量指令. 输出窗使用预先折叠了符号的表.
//! 每个元素上的运算与标量实现完全相同, 结果逐位一致.

use a52_core::ChannelMode;

use super::SynthBackend;
use crate::block::SubBlock;
use crate::downmix::{self, Channels, MixKernel};
use crate::imdct::{Complex, ImdctTables, fft_in_place};

const LANES: usize = 8;

/// 8 路分组的实现
#[derive(Debug, Clone, Copy, Default)]
pub struct LanesBackend;

impl SynthBackend for LanesBackend {
    fn name(&self) -> &'static str {
        "lanes"
    }

    fn imdct_512(&self, tables: &ImdctTables, data: &mut SubBlock, delay: &mut SubBlock, bias: f32) {
        let mut hi = [0.0f32; 128];
        let mut lo = [0.0f32; 128];
        let mut c = [0.0f32; 128];
        let mut s = [0.0f32; 128];
        for (i, &j) in tables.order128.iter().enumerate() {
            let j = j as usize;
            hi[i] = data[255 - 2 * j];
            lo[i] = data[2 * j];
            c[i] = tables.xcos1[j];
            s[i] = tables.xsin1[j];
        }

        let mut buf = [Complex::default(); 128];
        rotate_in(&mut buf, &hi, &lo, &c, &s);
        fft_in_place(&mut buf, tables);
        rotate_out(&mut buf, &tables.xcos1, &tables.xsin1);

        let mut out_part = [0.0f32; 256];
        let mut delay_part = [0.0f32; 256];
        for i in 0..64 {
            out_part[2 * i] = buf[64 + i].im;
            out_part[2 * i + 1] = buf[63 - i].re;
            out_part[128 + 2 * i] = buf[i].re;
            out_part[129 + 2 * i] = buf[127 - i].im;

            delay_part[2 * i] = buf[64 + i].re;
            delay_part[2 * i + 1] = buf[63 - i].im;
            delay_part[128 + 2 * i] = buf[i].im;
            delay_part[129 + 2 * i] = buf[127 - i].re;
        }

        window_overlap(tables, data, delay, &out_part, &delay_part, bias);
    }

    fn imdct_256(&self, tables: &ImdctTables, data: &mut SubBlock, delay: &mut SubBlock, bias: f32) {
        let mut hi1 = [0.0f32; 64];
        let mut lo1 = [0.0f32; 64];
        let mut hi2 = [0.0f32; 64];
        let mut lo2 = [0.0f32; 64];
        let mut c = [0.0f32; 64];
        let mut s = [0.0f32; 64];
        for (i, &k) in tables.order64.iter().enumerate() {
            let k = k as usize;
            let p = 2 * (127 - 2 * k);
            let q = 4 * k;
            hi1[i] = data[p];
            lo1[i] = data[q];
            hi2[i] = data[p + 1];
            lo2[i] = data[q + 1];
            c[i] = tables.xcos2[k];
            s[i] = tables.xsin2[k];
        }

        let mut buf1 = [Complex::default(); 64];
        let mut buf2 = [Complex::default(); 64];
        rotate_in(&mut buf1, &hi1, &lo1, &c, &s);
        rotate_in(&mut buf2, &hi2, &lo2, &c, &s);
        fft_in_place(&mut buf1, tables);
        fft_in_place(&mut buf2, tables);
        rotate_out(&mut buf1, &tables.xcos2, &tables.xsin2);
        rotate_out(&mut buf2, &tables.xcos2, &tables.xsin2);

        let mut out_part = [0.0f32; 256];
        let mut delay_part = [0.0f32; 256];
        for i in 0..64 {
            out_part[2 * i] = buf1[i].im;
            out_part[2 * i + 1] = buf1[63 - i].re;
            out_part[128 + 2 * i] = buf1[i].re;
            out_part[129 + 2 * i] = buf1[63 - i].im;

            delay_part[2 * i] = buf2[i].re;
            delay_part[2 * i + 1] = buf2[63 - i].im;
            delay_part[128 + 2 * i] = buf2[i].im;
            delay_part[129 + 2 * i] = buf2[63 - i].re;
        }

        window_overlap(tables, data, delay, &out_part, &delay_part, bias);
    }

    fn downmix(
        &self,
        channels: &mut Channels,
        coded: ChannelMode,
        output: ChannelMode,
        bias: f32,
        slev: f32,
    ) {
        downmix::downmix::<LanesMix>(channels, coded, output, bias, slev);
    }

    fn upmix(&self, channels: &mut Channels, coded: ChannelMode, output: ChannelMode) {
        downmix::upmix::<LanesMix>(channels, coded, output);
    }
}

/// 前旋转: z = (hi·c - lo·s, -(lo·c + hi·s))
fn rotate_in(buf: &mut [Complex], hi: &[f32], lo: &[f32], c: &[f32], s: &[f32]) {
    let groups = buf
        .chunks_exact_mut(LANES)
        .zip(hi.chunks_exact(LANES))
        .zip(lo.chunks_exact(LANES))
        .zip(c.chunks_exact(LANES).zip(s.chunks_exact(LANES)));
    for (((z, hi), lo), (c, s)) in groups {
        for k in 0..LANES {
            z[k] = Complex::new(hi[k] * c[k] - lo[k] * s[k], -(lo[k] * c[k] + hi[k] * s[k]));
        }
    }
}

/// 后旋转: z = conj(z)·(c + i·s)
fn rotate_out(buf: &mut [Complex], c: &[f32], s: &[f32]) {
    let groups = buf
        .chunks_exact_mut(LANES)
        .zip(c.chunks_exact(LANES).zip(s.chunks_exact(LANES)));
    for (z, (c, s)) in groups {
        for k in 0..LANES {
            let ar = z[k].re;
            let ai = -z[k].im;
            z[k] = Complex::new(ar * c[k] - ai * s[k], ar * s[k] + ai * c[k]);
        }
    }
}

/// 加窗叠加输出, 然后用尾窗覆盖延迟线
fn window_overlap(
    tables: &ImdctTables,
    data: &mut SubBlock,
    delay: &mut SubBlock,
    out_part: &[f32; 256],
    delay_part: &[f32; 256],
    bias: f32,
) {
    let groups = data
        .chunks_exact_mut(LANES)
        .zip(out_part.chunks_exact(LANES))
        .zip(tables.window_out.chunks_exact(LANES))
        .zip(delay.chunks_exact(LANES));
    for (((d, p), w), old) in groups {
        for k in 0..LANES {
            d[k] = p[k] * w[k] + old[k] + bias;
        }
    }

    let groups = delay
        .chunks_exact_mut(LANES)
        .zip(delay_part.chunks_exact(LANES))
        .zip(tables.window_delay.chunks_exact(LANES));
    for ((d, p), w) in groups {
        for k in 0..LANES {
            d[k] = p[k] * w[k];
        }
    }
}

/// 8 路分组的混音原语
#[derive(Debug, Clone, Copy, Default)]
pub struct LanesMix;

impl MixKernel for LanesMix {
    fn mix2to1(dest: &mut SubBlock, src: &SubBlock, bias: f32) {
        for (d, s) in dest.chunks_exact_mut(LANES).zip(src.chunks_exact(LANES)) {
            for k in 0..LANES {
                d[k] += s[k] + bias;
            }
        }
    }

    fn mix3to1(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, ..] = ch;
        let groups = s0
            .chunks_exact_mut(LANES)
            .zip(s1.chunks_exact(LANES))
            .zip(s2.chunks_exact(LANES));
        for ((a, b), c) in groups {
            for k in 0..LANES {
                a[k] += b[k] + c[k] + bias;
            }
        }
    }

    fn mix4to1(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, _] = ch;
        let groups = s0
            .chunks_exact_mut(LANES)
            .zip(s1.chunks_exact(LANES))
            .zip(s2.chunks_exact(LANES))
            .zip(s3.chunks_exact(LANES));
        for (((a, b), c), d) in groups {
            for k in 0..LANES {
                a[k] += b[k] + c[k] + d[k] + bias;
            }
        }
    }

    fn mix5to1(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, s4] = ch;
        let groups = s0
            .chunks_exact_mut(LANES)
            .zip(s1.chunks_exact(LANES))
            .zip(s2.chunks_exact(LANES))
            .zip(s3.chunks_exact(LANES))
            .zip(s4.chunks_exact(LANES));
        for ((((a, b), c), d), e) in groups {
            for k in 0..LANES {
                a[k] += b[k] + c[k] + d[k] + e[k] + bias;
            }
        }
    }

    fn mix3to2(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, ..] = ch;
        let groups = s0
            .chunks_exact_mut(LANES)
            .zip(s1.chunks_exact_mut(LANES))
            .zip(s2.chunks_exact(LANES));
        for ((a, b), c) in groups {
            for k in 0..LANES {
                let common = b[k] + bias;
                a[k] += common;
                b[k] = c[k] + common;
            }
        }
    }

    fn mix21to2(left: &mut SubBlock, right: &mut SubBlock, common: &SubBlock, bias: f32) {
        let groups = left
            .chunks_exact_mut(LANES)
            .zip(right.chunks_exact_mut(LANES))
            .zip(common.chunks_exact(LANES));
        for ((l, r), c) in groups {
            for k in 0..LANES {
                let v = c[k] + bias;
                l[k] += v;
                r[k] += v;
            }
        }
    }

    fn mix21to_s(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, ..] = ch;
        let groups = s0
            .chunks_exact_mut(LANES)
            .zip(s1.chunks_exact_mut(LANES))
            .zip(s2.chunks_exact(LANES));
        for ((a, b), sur) in groups {
            for k in 0..LANES {
                a[k] += bias - sur[k];
                b[k] += bias + sur[k];
            }
        }
    }

    fn mix31to2(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, _] = ch;
        let groups = s0
            .chunks_exact_mut(LANES)
            .zip(s1.chunks_exact_mut(LANES))
            .zip(s2.chunks_exact(LANES))
            .zip(s3.chunks_exact(LANES));
        for (((l, c), r), sur) in groups {
            for k in 0..LANES {
                let common = c[k] + sur[k] + bias;
                l[k] += common;
                c[k] = r[k] + common;
            }
        }
    }

    fn mix31to_s(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, _] = ch;
        let groups = s0
            .chunks_exact_mut(LANES)
            .zip(s1.chunks_exact_mut(LANES))
            .zip(s2.chunks_exact(LANES))
            .zip(s3.chunks_exact(LANES));
        for (((l, c), r), sur) in groups {
            for k in 0..LANES {
                let common = c[k] + bias;
                let surround = sur[k];
                l[k] += common - surround;
                c[k] = r[k] + common + surround;
            }
        }
    }

    fn mix22to_s(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, _] = ch;
        let groups = s0
            .chunks_exact_mut(LANES)
            .zip(s1.chunks_exact_mut(LANES))
            .zip(s2.chunks_exact(LANES))
            .zip(s3.chunks_exact(LANES));
        for (((l, r), ls), rs) in groups {
            for k in 0..LANES {
                let surround = ls[k] + rs[k];
                l[k] += bias - surround;
                r[k] += bias + surround;
            }
        }
    }

    fn mix32to2(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, s4] = ch;
        let groups = s0
            .chunks_exact_mut(LANES)
            .zip(s1.chunks_exact_mut(LANES))
            .zip(s2.chunks_exact(LANES))
            .zip(s3.chunks_exact(LANES))
            .zip(s4.chunks_exact(LANES));
        for ((((l, c), r), ls), rs) in groups {
            for k in 0..LANES {
                let common = c[k] + bias;
                l[k] += common + ls[k];
                c[k] = common + r[k] + rs[k];
            }
        }
    }

    fn mix32to_s(ch: &mut Channels, bias: f32) {
        let [s0, s1, s2, s3, s4] = ch;
        let groups = s0
            .chunks_exact_mut(LANES)
            .zip(s1.chunks_exact_mut(LANES))
            .zip(s2.chunks_exact(LANES))
            .zip(s3.chunks_exact(LANES))
            .zip(s4.chunks_exact(LANES));
        for ((((l, c), r), ls), rs) in groups {
            for k in 0..LANES {
                let common = c[k] + bias;
                let surround = ls[k] + rs[k];
                l[k] += common - surround;
                c[k] = r[k] + common + surround;
            }
        }
    }

    fn move2to1(a: &SubBlock, b: &SubBlock, dest: &mut SubBlock, bias: f32) {
        let groups = dest
            .chunks_exact_mut(LANES)
            .zip(a.chunks_exact(LANES).zip(b.chunks_exact(LANES)));
        for (d, (x, y)) in groups {
            for k in 0..LANES {
                d[k] = x[k] + y[k] + bias;
            }
        }
    }

    fn zero(dest: &mut SubBlock) {
        for d in dest.chunks_exact_mut(LANES) {
            d.fill(0.0);
        }
    }
}
