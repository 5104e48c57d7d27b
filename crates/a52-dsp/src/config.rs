//! 合成配置.

use a52_core::{A52Error, A52Result, ChannelMode, OutputRequest};
use serde::{Deserialize, Serialize};

use crate::backend::BackendPreference;
use crate::quantize::{DEFAULT_BIAS, DEFAULT_SCALE, Quantizer};

fn default_output() -> ChannelMode {
    ChannelMode::Stereo
}

fn default_bias() -> f32 {
    DEFAULT_BIAS
}

fn default_level() -> f32 {
    1.0
}

/// 合成上下文配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// 期望的输出声道模式
    #[serde(default = "default_output")]
    pub output: ChannelMode,
    /// 是否输出 LFE
    #[serde(default)]
    pub lfe: bool,
    /// 是否自动补偿下混电平
    #[serde(default)]
    pub adjust_level: bool,
    /// 合成样本携带的偏置
    #[serde(default = "default_bias")]
    pub bias: f32,
    /// 输出电平
    #[serde(default = "default_level")]
    pub level: f32,
    /// 后端偏好
    #[serde(default)]
    pub backend: BackendPreference,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            lfe: false,
            adjust_level: false,
            bias: default_bias(),
            level: default_level(),
            backend: BackendPreference::default(),
        }
    }
}

impl SynthConfig {
    /// 从输出请求构造, 其余取默认值
    pub fn from_request(request: OutputRequest) -> Self {
        Self {
            output: request.mode,
            lfe: request.lfe,
            adjust_level: request.adjust_level,
            ..Self::default()
        }
    }

    /// 对应的输出请求
    pub fn request(&self) -> OutputRequest {
        OutputRequest::new(self.output)
            .with_lfe(self.lfe)
            .with_adjust_level(self.adjust_level)
    }

    /// 对应的量化器
    pub fn quantizer(&self) -> Quantizer {
        Quantizer::new(self.bias, DEFAULT_SCALE)
    }

    /// 检查数值参数
    pub fn validate(&self) -> A52Result<()> {
        if !self.level.is_finite() || self.level <= 0.0 {
            return Err(A52Error::InvalidConfig(format!(
                "输出电平必须为正有限值: {}",
                self.level
            )));
        }
        if !self.bias.is_finite() {
            return Err(A52Error::InvalidConfig(format!("偏置必须为有限值: {}", self.bias)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = SynthConfig::default();
        assert_eq!(cfg.output, ChannelMode::Stereo);
        assert_eq!(cfg.bias, 384.0);
        assert_eq!(cfg.level, 1.0);
        assert_eq!(cfg.backend, BackendPreference::Auto);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let cfg: SynthConfig =
            serde_json::from_str(r#"{"output":"3f+2r","lfe":true,"backend":"scalar"}"#).unwrap();
        assert_eq!(cfg.output, ChannelMode::ThreeFrontTwoRear);
        assert!(cfg.lfe);
        assert!(!cfg.adjust_level);
        assert_eq!(cfg.bias, DEFAULT_BIAS);
        assert_eq!(cfg.backend, BackendPreference::Scalar);

        let empty: SynthConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, SynthConfig::default());
    }

    #[test]
    fn test_config_rejects_unknown_backend() {
        let r = serde_json::from_str::<SynthConfig>(r#"{"backend":"gpu"}"#);
        assert!(r.is_err(), "未知后端名应解析失败");
    }

    #[test]
    fn test_validate_level() {
        for level in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let cfg = SynthConfig {
                level,
                ..SynthConfig::default()
            };
            assert!(
                matches!(cfg.validate(), Err(A52Error::InvalidConfig(_))),
                "电平 {level} 应被拒绝"
            );
        }
    }

    #[test]
    fn test_request_roundtrip() {
        let req = OutputRequest::new(ChannelMode::Dolby)
            .with_lfe(true)
            .with_adjust_level(true);
        let cfg = SynthConfig::from_request(req);
        assert_eq!(cfg.request(), req);
        assert_eq!(cfg.quantizer(), Quantizer::default());
    }
}
