use crate::decoder::{HttpHead, StatusLine};
use crate::version::Version;

/// デコード済み HTTP レスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP バージョン
    pub version: Version,
    /// ステータスコード (200, 404, etc.)
    pub status_code: u16,
    /// ステータスフレーズ (OK, Not Found, etc.)
    pub reason_phrase: String,
    /// ヘッダー
    pub headers: Vec<(String, String)>,
    /// ボディ
    pub body: Vec<u8>,
}

impl Response {
    pub(crate) fn from_parts(
        line: StatusLine,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            version: line.version,
            status_code: line.status_code,
            reason_phrase: line.reason_phrase,
            headers,
            body,
        }
    }

    /// ステータスコードが成功 (2xx) か確認
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// ステータスコードが情報レスポンス (1xx) か確認
    pub fn is_informational(&self) -> bool {
        (100..200).contains(&self.status_code)
    }
}

impl HttpHead for Response {
    fn version(&self) -> Version {
        self.version
    }

    fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}
