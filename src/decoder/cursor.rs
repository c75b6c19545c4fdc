//! 受信チャンクのカーソル

/// 受信したチャンクへの読み取り専用ビュー
///
/// 位置は前進のみで巻き戻らない。チャンクごとに作成し、
/// 状態に渡し終えたら破棄する。
#[derive(Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// 未消費のバイト列
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// チャンク先頭からの消費済みバイト数
    pub fn position(&self) -> usize {
        self.pos
    }

    /// 未消費のバイト数
    pub fn len(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// 次のバイトを消費せずに取得
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// `n` バイト消費する
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.len(), "advance past end of chunk");
        self.pos += n.min(self.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance() {
        let mut cursor = ByteCursor::new(b"GET /");
        assert_eq!(cursor.len(), 5);
        assert_eq!(cursor.peek(), Some(b'G'));

        cursor.advance(3);
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.remaining(), b" /");
        cursor.advance(2);
        assert!(cursor.is_empty());
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn empty_chunk() {
        let mut cursor = ByteCursor::new(b"");
        assert!(cursor.is_empty());
        assert_eq!(cursor.peek(), None);
        cursor.advance(0);
        assert_eq!(cursor.position(), 0);
    }
}
