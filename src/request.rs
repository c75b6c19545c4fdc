use crate::decoder::{HttpHead, RequestLine};
use crate::method::Method;
use crate::version::Version;

/// デコード済み HTTP リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP メソッド (GET, POST, etc.)
    pub method: Method,
    /// リクエストターゲット
    pub target: String,
    /// HTTP バージョン
    pub version: Version,
    /// ヘッダー
    pub headers: Vec<(String, String)>,
    /// ボディ
    pub body: Vec<u8>,
}

impl Request {
    pub(crate) fn from_parts(
        line: RequestLine,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            method: line.method,
            target: line.target,
            version: line.version,
            headers,
            body,
        }
    }
}

impl HttpHead for Request {
    fn version(&self) -> Version {
        self.version
    }

    fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}
