//! 块级样本缓冲.
//!
//! 每个音频块 256 个样本, 按编码声道顺序存放 (acmod 顺序, 如 3F2R 为 L, C, R, Ls, Rs),
//! LFE 单独存放. 变换、矩阵和量化三个阶段都原地修改同一个块.

/// 每块每声道样本数
pub const BLOCK_LEN: usize = 256;

/// 全带宽声道最大数量
pub const MAX_CHANNELS: usize = 5;

/// 单声道子块
pub type SubBlock = [f32; BLOCK_LEN];

/// 一个音频块的全部声道
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBlock {
    /// 全带宽声道, 按编码声道顺序
    pub channels: [SubBlock; MAX_CHANNELS],
    /// LFE 声道
    pub lfe: SubBlock,
}

impl SampleBlock {
    /// 创建全零块
    pub fn new() -> Self {
        Self {
            channels: [[0.0; BLOCK_LEN]; MAX_CHANNELS],
            lfe: [0.0; BLOCK_LEN],
        }
    }

    /// 以同一常数填满所有声道
    pub fn filled(value: f32) -> Self {
        Self {
            channels: [[value; BLOCK_LEN]; MAX_CHANNELS],
            lfe: [value; BLOCK_LEN],
        }
    }
}

impl Default for SampleBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// 上游交来的一块频域系数 (已反量化)
#[derive(Debug, Clone, PartialEq)]
pub struct CodedBlock {
    /// 各编码声道的 256 个系数
    pub coeffs: [SubBlock; MAX_CHANNELS],
    /// 各声道的块切换标志 (true 表示使用两个 128 点短变换)
    pub block_switch: [bool; MAX_CHANNELS],
    /// LFE 系数 (仅低端有效, 其余为 0)
    pub lfe: SubBlock,
}

impl CodedBlock {
    /// 创建全零系数块
    pub fn new() -> Self {
        Self {
            coeffs: [[0.0; BLOCK_LEN]; MAX_CHANNELS],
            block_switch: [false; MAX_CHANNELS],
            lfe: [0.0; BLOCK_LEN],
        }
    }

    /// 前 `channels` 个声道的块切换标志是否一致
    pub fn uniform_block_switch(&self, channels: usize) -> bool {
        let flags = &self.block_switch[..channels.min(MAX_CHANNELS)];
        flags.windows(2).all(|pair| pair[0] == pair[1])
    }
}

impl Default for CodedBlock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_block_switch() {
        let mut block = CodedBlock::new();
        assert!(block.uniform_block_switch(5));
        block.block_switch[3] = true;
        assert!(block.uniform_block_switch(3), "只看前 3 个声道");
        assert!(!block.uniform_block_switch(4));
        block.block_switch = [true; MAX_CHANNELS];
        assert!(block.uniform_block_switch(5));
    }
}
