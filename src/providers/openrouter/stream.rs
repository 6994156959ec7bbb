use futures::StreamExt;

use super::models::StreamChunk;
use crate::providers::types::ProviderError;

/// Sentinel line that terminates the event stream.
const DONE_SENTINEL: &str = "[DONE]";

/// Accumulates raw byte chunks and yields only complete lines.
///
/// Network reads can split an SSE line anywhere, including inside a
/// multi-byte UTF-8 character; partial data stays buffered until its
/// newline arrives. Splitting on the newline byte is safe because 0x0A
/// never occurs inside a multi-byte sequence.
#[derive(Default)]
pub(crate) struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop(); // the newline itself
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }
}

/// Drain an SSE response body, concatenating every incremental
/// `delta.content` into the final reply. Malformed data lines are skipped;
/// they never abort the stream.
pub(crate) async fn collect_stream(response: reqwest::Response) -> Result<String, ProviderError> {
    let mut stream = response.bytes_stream();
    let mut lines = LineBuffer::default();
    let mut full_response = String::new();

    while let Some(chunk_result) = stream.next().await {
        let bytes = chunk_result
            .map_err(|e| ProviderError::NetworkError(format!("Stream error: {}", e)))?;

        for line in lines.push(&bytes) {
            let Some(data) = data_payload(&line) else {
                continue;
            };

            if data.trim() == DONE_SENTINEL {
                return Ok(full_response);
            }

            match serde_json::from_str::<StreamChunk>(data) {
                Ok(chunk) => {
                    if let Some(content) = chunk
                        .choices
                        .first()
                        .and_then(|c| c.delta.content.as_deref())
                    {
                        full_response.push_str(content);
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed SSE data line: {}", e);
                }
            }
        }
    }

    // Stream ended without the sentinel; return what arrived.
    Ok(full_response)
}

fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data: ")
        .or_else(|| line.strip_prefix("data:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_holds_partial_lines() {
        let mut buf = LineBuffer::default();
        assert!(buf.push(b"data: {\"a\"").is_empty());
        let lines = buf.push(b": 1}\ndata: tail");
        assert_eq!(lines, vec!["data: {\"a\": 1}".to_string()]);
        let lines = buf.push(b"\n");
        assert_eq!(lines, vec!["data: tail".to_string()]);
    }

    #[test]
    fn test_line_buffer_splits_multibyte_utf8() {
        let text = "data: प्रकाश\n".as_bytes();
        let mut buf = LineBuffer::default();
        // Split in the middle of a Devanagari character.
        assert!(buf.push(&text[..8]).is_empty());
        let lines = buf.push(&text[8..]);
        assert_eq!(lines, vec!["data: प्रकाश".to_string()]);
    }

    #[test]
    fn test_line_buffer_strips_crlf() {
        let mut buf = LineBuffer::default();
        let lines = buf.push(b"data: x\r\ndata: y\n");
        assert_eq!(lines, vec!["data: x".to_string(), "data: y".to_string()]);
    }

    #[test]
    fn test_data_payload() {
        assert_eq!(data_payload("data: [DONE]"), Some("[DONE]"));
        assert_eq!(data_payload("data:[DONE]"), Some("[DONE]"));
        assert_eq!(data_payload(": keep-alive"), None);
        assert_eq!(data_payload(""), None);
    }
}
