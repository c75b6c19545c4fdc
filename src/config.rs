//! デコーダー設定

use crate::limits::DecoderLimits;

/// 行末の扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineEnding {
    /// CRLF のみ受け付ける
    #[default]
    Strict,
    /// LF 単独も行末として受け付ける (RFC 9112 Section 2.2)
    ///
    /// CR 単独は受け付けない。
    AllowBareLf,
}

/// デコーダー設定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecoderConfig {
    pub limits: DecoderLimits,
    pub line_ending: LineEnding,
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limits(mut self, limits: DecoderLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_strict() {
        let config = DecoderConfig::default();
        assert_eq!(config.line_ending, LineEnding::Strict);
        assert_eq!(config.limits, DecoderLimits::default());
    }

    #[test]
    fn builder() {
        let config = DecoderConfig::new()
            .line_ending(LineEnding::AllowBareLf)
            .limits(DecoderLimits::unlimited());
        assert_eq!(config.line_ending, LineEnding::AllowBareLf);
        assert_eq!(config.limits.max_body_size, usize::MAX);
    }
}
