//! 运行时 CPU 能力探测.

use bitflags::bitflags;

bitflags! {
    /// CPU 向量指令能力
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CpuCaps: u32 {
        /// x86 SSE
        const SSE    = 1 << 0;
        /// x86 SSE2
        const SSE2   = 1 << 1;
        /// x86 AVX
        const AVX    = 1 << 2;
        /// x86 AVX2
        const AVX2   = 1 << 3;
        /// ARM NEON
        const NEON   = 1 << 4;
    }
}

impl CpuCaps {
    /// 探测当前 CPU 的能力
    pub fn detect() -> Self {
        let mut caps = Self::empty();
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            caps.set(Self::SSE, std::arch::is_x86_feature_detected!("sse"));
            caps.set(Self::SSE2, std::arch::is_x86_feature_detected!("sse2"));
            caps.set(Self::AVX, std::arch::is_x86_feature_detected!("avx"));
            caps.set(Self::AVX2, std::arch::is_x86_feature_detected!("avx2"));
        }
        #[cfg(target_arch = "aarch64")]
        {
            caps.set(
                Self::NEON,
                std::arch::is_aarch64_feature_detected!("neon"),
            );
        }
        log::debug!("CPU 能力: {caps:?}");
        caps
    }

    /// 是否具备任一宽向量单元, 可走分道 (lanes) 后端
    pub fn has_vector_unit(self) -> bool {
        self.intersects(Self::SSE2 | Self::AVX | Self::NEON)
    }
}
