//! 分裂基 (split-radix) 时域抽取 FFT.
//!
//! 输入按 [`ImdctTables::order128`] / [`ImdctTables::order64`] 排列, 输出为自然顺序.
//! 正向变换, 旋转因子为 e^{-2πik/N}.

use super::Complex;
use super::tables::ImdctTables;

/// 原地 N 点 FFT, N 为 4..=128 的 2 的幂
pub fn fft_in_place(buf: &mut [Complex], tables: &ImdctTables) {
    let n = buf.len();
    debug_assert!(n.is_power_of_two() && (4..=128).contains(&n));
    match n {
        4 => dft4(buf),
        8 => dft8(buf, tables),
        _ => {
            let (even, odd) = buf.split_at_mut(n / 2);
            fft_in_place(even, tables);
            let (odd1, odd3) = odd.split_at_mut(n / 4);
            fft_in_place(odd1, tables);
            fft_in_place(odd3, tables);
            merge(buf, tables);
        }
    }
}

/// 合并一个 N/2 点与两个 N/4 点子变换
fn merge(buf: &mut [Complex], tables: &ImdctTables) {
    let n = buf.len();
    let half = n / 2;
    let quarter = n / 4;
    for k in 0..quarter {
        let w1 = tables.twiddle_for(n, k);
        let w3 = if 3 * k < half {
            tables.twiddle_for(n, 3 * k)
        } else {
            -tables.twiddle_for(n, 3 * k - half)
        };
        let t1 = w1 * buf[half + k];
        let t2 = w3 * buf[half + quarter + k];
        let sum = t1 + t2;
        let diff = t1 - t2;

        let u0 = buf[k];
        let u1 = buf[k + quarter];
        buf[k] = u0 + sum;
        buf[k + half] = u0 - sum;
        buf[k + quarter] = u1 + diff.mul_neg_i();
        buf[k + half + quarter] = u1 + diff.mul_i();
    }
}

fn dft4(buf: &mut [Complex]) {
    let a = buf[0] + buf[2];
    let b = buf[0] - buf[2];
    let c = buf[1] + buf[3];
    let d = buf[1] - buf[3];
    buf[0] = a + c;
    buf[2] = a - c;
    buf[1] = b + d.mul_neg_i();
    buf[3] = b + d.mul_i();
}

fn dft8(buf: &mut [Complex], tables: &ImdctTables) {
    let mut even = [buf[0], buf[2], buf[4], buf[6]];
    let mut odd = [buf[1], buf[3], buf[5], buf[7]];
    dft4(&mut even);
    dft4(&mut odd);
    for k in 0..4 {
        let t = tables.twiddle_for(8, k) * odd[k];
        buf[k] = even[k] + t;
        buf[k + 4] = even[k] - t;
    }
}
