//! IMDCT 常量表.
//!
//! 进程内只构建一次, 之后只读共享.

use std::f64::consts::PI;
use std::sync::OnceLock;

use super::Complex;

/// 旋转因子层数: 第 m 层有 2^m 个 e^{-iπk/2^m}
pub const TWIDDLE_LEVELS: usize = 7;

/// IMDCT 所需的全部只读表
#[derive(Debug, Clone)]
pub struct ImdctTables {
    /// KBD 半窗 (α = 5), 256 点
    pub window: [f32; 256],
    /// 输出段符号折叠后的窗: 偶数位取负
    pub window_out: [f32; 256],
    /// 延迟段符号折叠后的尾窗 w[255-n]
    pub window_delay: [f32; 256],
    /// 512 点前/后旋转: -cos(π(8i+1)/2048)
    pub xcos1: [f32; 128],
    /// 512 点前/后旋转: -sin(π(8i+1)/2048)
    pub xsin1: [f32; 128],
    /// 256 点前/后旋转: -cos(π(8i+1)/1024)
    pub xcos2: [f32; 64],
    /// 256 点前/后旋转: -sin(π(8i+1)/1024)
    pub xsin2: [f32; 64],
    /// FFT 旋转因子, `twiddle[m][k] = e^{-iπk/2^m}`, k < 2^m
    pub twiddle: [[Complex; 64]; TWIDDLE_LEVELS],
    /// 128 点分裂基输入顺序
    pub order128: [u8; 128],
    /// 64 点分裂基输入顺序
    pub order64: [u8; 64],
}

static TABLES: OnceLock<ImdctTables> = OnceLock::new();

impl ImdctTables {
    /// 进程共享的表
    pub fn global() -> &'static ImdctTables {
        TABLES.get_or_init(|| {
            log::debug!("构建 IMDCT 常量表");
            Self::build()
        })
    }

    fn build() -> Self {
        let window = kbd_window();

        let mut window_out = [0.0f32; 256];
        let mut window_delay = [0.0f32; 256];
        for n in 0..256 {
            window_out[n] = if n % 2 == 0 { -window[n] } else { window[n] };
            let tail = window[255 - n];
            // 前半段偶负奇正, 后半段偶正奇负
            let negative = (n < 128) == (n % 2 == 0);
            window_delay[n] = if negative { -tail } else { tail };
        }

        let mut xcos1 = [0.0f32; 128];
        let mut xsin1 = [0.0f32; 128];
        for i in 0..128 {
            let angle = PI / 2048.0 * (8 * i + 1) as f64;
            xcos1[i] = -angle.cos() as f32;
            xsin1[i] = -angle.sin() as f32;
        }

        let mut xcos2 = [0.0f32; 64];
        let mut xsin2 = [0.0f32; 64];
        for i in 0..64 {
            let angle = PI / 1024.0 * (8 * i + 1) as f64;
            xcos2[i] = -angle.cos() as f32;
            xsin2[i] = -angle.sin() as f32;
        }

        let mut twiddle = [[Complex::default(); 64]; TWIDDLE_LEVELS];
        for (m, level) in twiddle.iter_mut().enumerate() {
            let j = 1usize << m;
            for (k, w) in level.iter_mut().take(j).enumerate() {
                let angle = -PI * k as f64 / j as f64;
                *w = Complex::new(angle.cos() as f32, angle.sin() as f32);
            }
        }

        let mut order128 = [0u8; 128];
        fill_order(&mut order128);
        let mut order64 = [0u8; 64];
        fill_order(&mut order64);

        Self {
            window,
            window_out,
            window_delay,
            xcos1,
            xsin1,
            xcos2,
            xsin2,
            twiddle,
            order128,
            order64,
        }
    }

    /// N 点 FFT 的 W_N^k (k < N/2)
    #[inline]
    pub fn twiddle_for(&self, n: usize, k: usize) -> Complex {
        self.twiddle[n.trailing_zeros() as usize - 1][k]
    }
}

/// 修正的零阶 Bessel 级数, 自变量为 (x/2)^2
fn bessel_i0(x: f64) -> f64 {
    let mut bessel = 1.0;
    for i in (1..=100u32).rev() {
        bessel = bessel * x / f64::from(i * i) + 1.0;
    }
    bessel
}

/// Kaiser-Bessel 派生窗 (α = 5) 的前 256 点
fn kbd_window() -> [f32; 256] {
    let alpha = 5.0 * PI / 256.0;
    let mut cumulative = [0.0f64; 256];
    let mut sum = 0.0;
    for (i, c) in cumulative.iter_mut().enumerate() {
        sum += bessel_i0((i * (256 - i)) as f64 * alpha * alpha);
        *c = sum;
    }
    sum += 1.0;

    let mut window = [0.0f32; 256];
    for (w, c) in window.iter_mut().zip(cumulative.iter()) {
        *w = (c / sum).sqrt() as f32;
    }
    window
}

/// 生成分裂基 DIT 的输入顺序.
///
/// N 点节点 = 偶数下标的 N/2 点子节点 + 4m+1 与 4m+3 两个 N/4 点子节点,
/// 不超过 8 点的叶子保持自然顺序.
fn fill_order(out: &mut [u8]) {
    let mut pos = 0;
    push_order(out, &mut pos, out.len(), 1, 0);
    debug_assert_eq!(pos, out.len());
}

fn push_order(out: &mut [u8], pos: &mut usize, n: usize, stride: usize, offset: usize) {
    if n <= 8 {
        for j in 0..n {
            out[*pos] = (offset + stride * j) as u8;
            *pos += 1;
        }
        return;
    }
    push_order(out, pos, n / 2, stride * 2, offset);
    push_order(out, pos, n / 4, stride * 4, offset + stride);
    push_order(out, pos, n / 4, stride * 4, offset + stride * 3);
}
