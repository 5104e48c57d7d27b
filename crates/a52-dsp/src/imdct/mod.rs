//! A/52 IMDCT.
//!
//! 每个声道块 256 个系数变换为 512 个加窗时域样本, 前 256 个与延迟线叠加后输出,
//! 后 256 个写回延迟线供下一块使用.
//!
//! - 长块 (`imdct_512`): 一个 128 点复数 FFT
//! - 短块 (`imdct_256`): 偶数/奇数系数各做一个 64 点 FFT, 前者输出, 后者进延迟线
//!
//! 这里是标量参考实现, 分道实现见 `backend::lanes`, 两者逐位一致.

pub mod fft;
pub mod tables;


use std::ops::{Add, Mul, Neg, Sub};

use crate::block::SubBlock;
pub use fft::fft_in_place;
pub use tables::ImdctTables;

/// 单精度复数
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Complex {
    /// 实部
    pub re: f32,
    /// 虚部
    pub im: f32,
}

impl Complex {
    /// 创建复数
    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }

    /// 乘以 i
    #[inline]
    pub fn mul_i(self) -> Self {
        Self::new(-self.im, self.re)
    }

    /// 乘以 -i
    #[inline]
    pub fn mul_neg_i(self) -> Self {
        Self::new(self.im, -self.re)
    }
}

impl Add for Complex {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Neg for Complex {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

/// 后旋转: z = conj(z) · (c + i·s)
#[inline]
fn post_rotate(buf: &mut [Complex], xcos: &[f32], xsin: &[f32]) {
    for ((z, &c), &s) in buf.iter_mut().zip(xcos).zip(xsin) {
        let ar = z.re;
        let ai = -z.im;
        z.re = ar * c - ai * s;
        z.im = ar * s + ai * c;
    }
}

/// 长块 IMDCT: `data` 输入 256 个系数, 输出 256 个样本; `delay` 读取后被覆盖
pub fn imdct_512(tables: &ImdctTables, data: &mut SubBlock, delay: &mut SubBlock, bias: f32) {
    let mut buf = [Complex::default(); 128];

    // 前旋转并按分裂基顺序放置
    for (z, &j) in buf.iter_mut().zip(tables.order128.iter()) {
        let j = j as usize;
        let hi = data[255 - 2 * j];
        let lo = data[2 * j];
        let (c, s) = (tables.xcos1[j], tables.xsin1[j]);
        *z = Complex::new(hi * c - lo * s, -(lo * c + hi * s));
    }

    fft_in_place(&mut buf, tables);
    post_rotate(&mut buf, &tables.xcos1, &tables.xsin1);

    let w = &tables.window;
    for i in 0..64 {
        data[2 * i] = -buf[64 + i].im * w[2 * i] + delay[2 * i] + bias;
        data[2 * i + 1] = buf[63 - i].re * w[2 * i + 1] + delay[2 * i + 1] + bias;
    }
    for i in 0..64 {
        data[128 + 2 * i] = -buf[i].re * w[128 + 2 * i] + delay[128 + 2 * i] + bias;
        data[129 + 2 * i] = buf[127 - i].im * w[129 + 2 * i] + delay[129 + 2 * i] + bias;
    }

    // 窗的后沿进延迟线
    for i in 0..64 {
        delay[2 * i] = -buf[64 + i].re * w[255 - 2 * i];
        delay[2 * i + 1] = buf[63 - i].im * w[254 - 2 * i];
    }
    for i in 0..64 {
        delay[128 + 2 * i] = buf[i].im * w[127 - 2 * i];
        delay[129 + 2 * i] = -buf[127 - i].re * w[126 - 2 * i];
    }
}

/// 短块 IMDCT: 系数交错存放两个 128 点变换
pub fn imdct_256(tables: &ImdctTables, data: &mut SubBlock, delay: &mut SubBlock, bias: f32) {
    let mut buf1 = [Complex::default(); 64];
    let mut buf2 = [Complex::default(); 64];

    for (i, &k) in tables.order64.iter().enumerate() {
        let k = k as usize;
        let p = 2 * (127 - 2 * k);
        let q = 4 * k;
        let (c, s) = (tables.xcos2[k], tables.xsin2[k]);
        buf1[i] = Complex::new(data[p] * c - data[q] * s, -(data[q] * c + data[p] * s));
        buf2[i] = Complex::new(
            data[p + 1] * c - data[q + 1] * s,
            -(data[q + 1] * c + data[p + 1] * s),
        );
    }

    fft_in_place(&mut buf1, tables);
    fft_in_place(&mut buf2, tables);
    post_rotate(&mut buf1, &tables.xcos2, &tables.xsin2);
    post_rotate(&mut buf2, &tables.xcos2, &tables.xsin2);

    let w = &tables.window;
    for i in 0..64 {
        data[2 * i] = -buf1[i].im * w[2 * i] + delay[2 * i] + bias;
        data[2 * i + 1] = buf1[63 - i].re * w[2 * i + 1] + delay[2 * i + 1] + bias;
    }
    for i in 0..64 {
        data[128 + 2 * i] = -buf1[i].re * w[128 + 2 * i] + delay[128 + 2 * i] + bias;
        data[129 + 2 * i] = buf1[63 - i].im * w[129 + 2 * i] + delay[129 + 2 * i] + bias;
    }

    for i in 0..64 {
        delay[2 * i] = -buf2[i].re * w[255 - 2 * i];
        delay[2 * i + 1] = buf2[63 - i].im * w[254 - 2 * i];
    }
    for i in 0..64 {
        delay[128 + 2 * i] = buf2[i].im * w[127 - 2 * i];
        delay[129 + 2 * i] = -buf2[63 - i].re * w[126 - 2 * i];
    }
}
