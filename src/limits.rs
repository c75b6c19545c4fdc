/// デコーダーの制限設定
///
/// 部分トークンの蓄積量はすべてここで上限を持つ。
/// 上限がない値は `usize::MAX` を指定する。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecoderLimits {
    /// スタートラインの各トークン (メソッド、リクエストターゲット、バージョン、
    /// ステータスコード、reason-phrase) の最大長 (デフォルト: 8KB)
    pub max_token_size: usize,
    /// ヘッダー 1 行 (名前、コロン、空白、値。CRLF は含まない) の最大長 (デフォルト: 8KB)
    pub max_header_line_size: usize,
    /// 最大ヘッダー数 (デフォルト: 100)
    pub max_headers_count: usize,
    /// 最大ボディサイズ (デフォルト: 10MB)
    pub max_body_size: usize,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_token_size: 8 * 1024,        // 8KB
            max_header_line_size: 8 * 1024,  // 8KB
            max_headers_count: 100,
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl DecoderLimits {
    /// 制限なしの設定を作成
    pub fn unlimited() -> Self {
        Self {
            max_token_size: usize::MAX,
            max_header_line_size: usize::MAX,
            max_headers_count: usize::MAX,
            max_body_size: usize::MAX,
        }
    }
}
