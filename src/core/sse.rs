//! SSE (Server-Sent Events) decoding for streaming completion responses.
//!
//! The DeepSeek chat-completions API streams `data:` lines terminated by the
//! `[DONE]` sentinel. Chunks arrive at arbitrary byte boundaries, so the
//! decoder buffers partial lines between pushes.

use serde::de::DeserializeOwned;

/// Buffering SSE decoder.
///
/// Feed it raw response chunks; it yields complete `data:` frames and keeps
/// any trailing partial line for the next push. The buffer is capped so a
/// malformed stream cannot grow it without bound.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
}

impl SseDecoder {
    // Cap at 1MB; a single completion delta is far smaller.
    const MAX_BUFFER: usize = 1024 * 1024;

    pub fn new() -> Self {
        Self::default()
    }

    /// Push a chunk of bytes, returning every complete frame it finished.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        if self.buffer.len() > Self::MAX_BUFFER {
            tracing::warn!("SSE buffer exceeded {} bytes, truncating", Self::MAX_BUFFER);
            let mut keep_from = self.buffer.len() - Self::MAX_BUFFER / 2;
            // The cut must not land inside a multibyte character.
            while !self.buffer.is_char_boundary(keep_from) {
                keep_from += 1;
            }
            self.buffer = self.buffer[keep_from..].to_string();
        }

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim().to_string();
            self.buffer.drain(..=pos);

            if let Some(data) = line.strip_prefix("data: ") {
                frames.push(SseFrame {
                    data: data.to_string(),
                });
            }
        }
        frames
    }

    /// Push a string directly (used in tests)
    pub fn push_str(&mut self, s: &str) -> Vec<SseFrame> {
        self.push(s.as_bytes())
    }

    /// True if a partial line is still buffered
    pub fn has_remaining(&self) -> bool {
        !self.buffer.is_empty()
    }
}

/// One complete `data:` frame, prefix already stripped.
#[derive(Debug, Clone)]
pub struct SseFrame {
    pub data: String,
}

impl SseFrame {
    /// The end-of-stream sentinel
    pub fn is_done(&self) -> bool {
        self.data == "[DONE]"
    }

    /// Parse the payload as JSON, ignoring frames that do not fit the schema
    /// (keep-alives, vendor extensions).
    pub fn parse_json<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_str(&self.data).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn decodes_single_frame() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push_str("data: {\"delta\": \"hi\"}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"delta\": \"hi\"}");
    }

    #[test]
    fn recognizes_done_sentinel() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push_str("data: [DONE]\n");
        assert!(frames[0].is_done());
    }

    #[test]
    fn buffers_across_chunk_boundaries() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push_str("data: {\"n\":").is_empty());
        assert!(decoder.has_remaining());

        let frames = decoder.push_str(" 1}\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"n\": 1}");
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn yields_multiple_frames_per_push() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push_str("data: a\ndata: b\n\ndata: c\n");
        let texts: Vec<&str> = frames.iter().map(|f| f.data.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn overflow_truncation_respects_char_boundaries() {
        let mut decoder = SseDecoder::new();

        // One unterminated line of 3-byte characters, sized so the overflow
        // cut lands mid-character unless it is walked to a boundary.
        let flood = "中".repeat(SseDecoder::MAX_BUFFER / 3 + 1);
        assert!(decoder.push_str(&flood).is_empty());

        let frames = decoder.push_str("\ndata: ok\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "ok");
    }

    #[test]
    fn parse_json_skips_non_json() {
        #[derive(Deserialize)]
        struct Delta {
            n: i32,
        }

        let mut decoder = SseDecoder::new();
        let frames = decoder.push_str("data: keep-alive\ndata: {\"n\": 7}\n");
        assert!(frames[0].parse_json::<Delta>().is_none());
        assert_eq!(frames[1].parse_json::<Delta>().unwrap().n, 7);
    }
}
