//! Wire framing.
//!
//! The engine speaks either one JSON text payload per WebSocket frame, or
//! batches of newline-joined payloads inside binary frames. The configured
//! format governs what we transmit; inbound frames are decoded by their
//! actual kind, so an engine mixing both still routes cleanly.

/// Frame encoding negotiated at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// One JSON text payload per frame.
    #[default]
    Text,
    /// Newline-terminated JSON payloads in binary frames.
    Binary,
}

impl WireFormat {
    /// Parse the configuration selector: `"1"` and `"true"` (after
    /// trimming) select binary framing, anything else text.
    pub fn from_selector(raw: &str) -> Self {
        match raw.trim() {
            "1" | "true" => WireFormat::Binary,
            _ => WireFormat::Text,
        }
    }
}

/// An encoded outbound frame, ready for the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// An inbound frame as pulled off the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// Error decoding an inbound frame into payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameDecodeError {
    #[error("binary frame is not valid UTF-8")]
    InvalidUtf8,
}

/// Encode one serialized payload according to the wire format.
///
/// Binary framing appends the trailing newline the engine uses as a
/// payload separator.
pub fn encode_frame(format: WireFormat, json: String) -> OutFrame {
    match format {
        WireFormat::Text => OutFrame::Text(json),
        WireFormat::Binary => {
            let mut bytes = json.into_bytes();
            bytes.push(b'\n');
            OutFrame::Binary(bytes)
        }
    }
}

/// Split an inbound frame into its JSON payloads.
///
/// Text frames carry a single payload. Binary frames decode to text and
/// split on newlines. Empty segments (including the one after a trailing
/// newline) are discarded.
pub fn frame_payloads(frame: InFrame) -> Result<Vec<String>, FrameDecodeError> {
    let text = match frame {
        InFrame::Text(text) => return Ok(non_empty(vec![text])),
        InFrame::Binary(bytes) => {
            String::from_utf8(bytes).map_err(|_| FrameDecodeError::InvalidUtf8)?
        }
    };
    Ok(non_empty(text.split('\n').map(str::to_string).collect()))
}

fn non_empty(payloads: Vec<String>) -> Vec<String> {
    payloads.into_iter().filter(|p| !p.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_accepts_truthy_values() {
        assert_eq!(WireFormat::from_selector("1"), WireFormat::Binary);
        assert_eq!(WireFormat::from_selector("true"), WireFormat::Binary);
        assert_eq!(WireFormat::from_selector(" true "), WireFormat::Binary);
        assert_eq!(WireFormat::from_selector("0"), WireFormat::Text);
        assert_eq!(WireFormat::from_selector(""), WireFormat::Text);
        assert_eq!(WireFormat::from_selector("yes"), WireFormat::Text);
    }

    #[test]
    fn text_format_sends_payload_verbatim() {
        let frame = encode_frame(WireFormat::Text, "{\"method\":\"shutdown\"}".to_string());
        assert_eq!(frame, OutFrame::Text("{\"method\":\"shutdown\"}".to_string()));
    }

    #[test]
    fn binary_format_appends_newline() {
        let frame = encode_frame(WireFormat::Binary, "{}".to_string());
        assert_eq!(frame, OutFrame::Binary(b"{}\n".to_vec()));
    }

    #[test]
    fn text_frame_is_one_payload() {
        let payloads = frame_payloads(InFrame::Text("{\"a\":1}".to_string())).unwrap();
        assert_eq!(payloads, vec!["{\"a\":1}".to_string()]);
    }

    #[test]
    fn empty_text_frame_has_no_payloads() {
        let payloads = frame_payloads(InFrame::Text(String::new())).unwrap();
        assert!(payloads.is_empty());
    }

    #[test]
    fn binary_frame_splits_on_newlines() {
        let payloads = frame_payloads(InFrame::Binary(b"{\"a\":1}\n{\"b\":2}\n".to_vec())).unwrap();
        assert_eq!(payloads, vec!["{\"a\":1}".to_string(), "{\"b\":2}".to_string()]);
    }

    #[test]
    fn binary_frame_drops_empty_segments() {
        let payloads = frame_payloads(InFrame::Binary(b"\n{\"a\":1}\n\n".to_vec())).unwrap();
        assert_eq!(payloads, vec!["{\"a\":1}".to_string()]);
    }

    #[test]
    fn invalid_utf8_rejects_the_whole_frame() {
        let err = frame_payloads(InFrame::Binary(vec![0xff, 0xfe])).unwrap_err();
        assert_eq!(err, FrameDecodeError::InvalidUtf8);
    }
}
