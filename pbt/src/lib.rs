//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// トークン生成
// ========================================

/// HTTP メソッド
pub fn http_method() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
    ])
}

/// HTTP バージョン
pub fn http_version() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["HTTP/1.0", "HTTP/1.1"])
}

/// origin-form のリクエストターゲット
pub fn request_target() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        Just("*".to_string()),
        "/[a-zA-Z0-9/_.~-]{1,48}(\\?[a-z0-9=&]{1,16})?".prop_map(|s| s),
    ]
}

/// 1 つ以上の SP / HTAB
pub fn linear_whitespace() -> impl Strategy<Value = String> {
    "[ \t]{1,4}".prop_map(|s| s)
}

/// field-name (token)
pub fn header_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9!#$%&'*+.^_`|~-]{0,23}"
        .prop_filter("framing headers are generated separately", |name| {
            !name.eq_ignore_ascii_case("content-length")
                && !name.eq_ignore_ascii_case("transfer-encoding")
        })
}

/// 前後に空白を含まない field-value
pub fn header_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[!-~]([ !-~]{0,30}[!-~])?".prop_map(|s| s),
    ]
}

pub fn headers() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec((header_name(), header_value()), 0..8)
}

pub fn body() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..256)
}

// ========================================
// チャンク分割
// ========================================

/// 入力の分割位置 (昇順、重複あり)
///
/// 重複した位置は空のチャンクになる。
pub fn split_points(len: usize) -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0..=len, 0..16).prop_map(|mut points| {
        points.sort_unstable();
        points
    })
}

/// 分割位置でチャンクに分ける
pub fn split_at_points<'a>(input: &'a [u8], points: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::with_capacity(points.len() + 1);
    let mut start = 0;
    for &point in points {
        let point = point.min(input.len());
        chunks.push(&input[start..point]);
        start = point;
    }
    chunks.push(&input[start..]);
    chunks
}

/// 生成したリクエストをワイヤ形式にする
pub fn encode_request(
    method: &str,
    target: &str,
    version: &str,
    headers: &[(String, String)],
    body: &[u8],
) -> Vec<u8> {
    let mut buf = format!("{method} {target} {version}\r\n").into_bytes();
    for (name, value) in headers {
        buf.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    if !body.is_empty() {
        buf.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
    }
    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(body);
    buf
}
