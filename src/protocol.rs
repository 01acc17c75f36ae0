/// Host command protocol.
///
/// Anything the host writes that starts with `#CMD#` is a command; the
/// remainder is searched (case-sensitive substring) for the keywords below,
/// first match wins in declaration order. Anything else is a raw frame.
use core::fmt::Write;

use heapless::String;

use crate::mode::Mode;
use crate::record::FRAME_BUFFER_LEN;

/// Prefix marking a chunk as a command.
pub const CMD_PREFIX: &[u8] = b"#CMD#";

/// Switch to capture mode.
pub const KW_MODE_CAPTURE: &[u8] = b"MODE_SNIFF";

/// Switch to transmit mode.
pub const KW_MODE_TRANSMIT: &[u8] = b"MODE_TX";

/// Report mode, queue occupancy and drop count.
pub const KW_STATUS: &[u8] = b"STATUS";

/// Maximum length of a status line: `SNIFF`, two 20-digit `usize` counts and
/// a 10-digit drop count come to 86 bytes.
pub const MAX_STATUS_LEN: usize = 96;

pub type StatusLine = String<MAX_STATUS_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetMode(Mode),
    ReportStatus,
    Unrecognized,
}

/// One chunk of serial input, classified.
#[derive(Debug, PartialEq, Eq)]
pub enum Chunk<'a> {
    /// Prefixed chunk; carries the text after the prefix for logging.
    Command(Command, &'a [u8]),
    /// Anything else, truncated to the frame buffer size.
    Frame(&'a [u8]),
}

/// Classify a chunk of serial input.
pub fn classify(chunk: &[u8]) -> Chunk<'_> {
    match chunk.strip_prefix(CMD_PREFIX) {
        Some(rest) => Chunk::Command(parse_command(rest), rest),
        None => Chunk::Frame(&chunk[..chunk.len().min(FRAME_BUFFER_LEN)]),
    }
}

/// Match the text after the prefix against the known keywords.
pub fn parse_command(rest: &[u8]) -> Command {
    if contains(rest, KW_MODE_CAPTURE) {
        Command::SetMode(Mode::Capture)
    } else if contains(rest, KW_MODE_TRANSMIT) {
        Command::SetMode(Mode::Transmit)
    } else if contains(rest, KW_STATUS) {
        Command::ReportStatus
    } else {
        Command::Unrecognized
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Format the diagnostic status line, e.g.
/// `STATUS mode=SNIFF queue=3/40 dropped=0\r\n`.
pub fn format_status(
    mode: Mode,
    queued: usize,
    capacity: usize,
    dropped: u32,
    out: &mut StatusLine,
) -> core::fmt::Result {
    out.clear();
    write!(
        out,
        "STATUS mode={} queue={}/{} dropped={}\r\n",
        mode, queued, capacity, dropped
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_commands_are_recognized() {
        assert_eq!(
            classify(b"#CMD#MODE_TX"),
            Chunk::Command(Command::SetMode(Mode::Transmit), b"MODE_TX")
        );
        assert_eq!(
            classify(b"#CMD#MODE_SNIFF\r\n"),
            Chunk::Command(Command::SetMode(Mode::Capture), b"MODE_SNIFF\r\n")
        );
        assert_eq!(parse_command(b"STATUS"), Command::ReportStatus);
    }

    #[test]
    fn keywords_match_anywhere_in_remainder() {
        assert_eq!(parse_command(b"please MODE_TX now"), Command::SetMode(Mode::Transmit));
        assert_eq!(parse_command(b"xxSTATUSxx"), Command::ReportStatus);
    }

    #[test]
    fn capture_keyword_takes_precedence() {
        assert_eq!(
            parse_command(b"STATUS MODE_TX MODE_SNIFF"),
            Command::SetMode(Mode::Capture)
        );
        assert_eq!(parse_command(b"STATUS MODE_TX"), Command::SetMode(Mode::Transmit));
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(parse_command(b"mode_tx"), Command::Unrecognized);
        assert_eq!(parse_command(b"status"), Command::Unrecognized);
        assert_eq!(parse_command(b""), Command::Unrecognized);
    }

    #[test]
    fn binary_remainder_is_unrecognized() {
        assert_eq!(parse_command(&[0xFF, 0x00, 0x80]), Command::Unrecognized);
    }

    #[test]
    fn unprefixed_chunk_is_a_frame() {
        assert_eq!(classify(&[0x01, 0x02, 0x03]), Chunk::Frame(&[0x01, 0x02, 0x03]));
        // Prefix must be at the very start
        assert!(matches!(classify(b" #CMD#MODE_TX"), Chunk::Frame(_)));
    }

    #[test]
    fn oversized_frame_is_truncated() {
        let chunk = [0x7Fu8; 300];
        match classify(&chunk) {
            Chunk::Frame(frame) => assert_eq!(frame.len(), FRAME_BUFFER_LEN),
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[test]
    fn status_line_format() {
        let mut line = StatusLine::new();
        format_status(Mode::Capture, 0, 40, 0, &mut line).unwrap();
        assert_eq!(line.as_str(), "STATUS mode=SNIFF queue=0/40 dropped=0\r\n");

        format_status(Mode::Transmit, 40, 40, u32::MAX, &mut line).unwrap();
        assert_eq!(
            line.as_str(),
            "STATUS mode=TX queue=40/40 dropped=4294967295\r\n"
        );
    }

    #[test]
    fn widest_status_line_fits() {
        let mut line = StatusLine::new();
        format_status(Mode::Capture, usize::MAX, usize::MAX, u32::MAX, &mut line).unwrap();
        assert!(line.ends_with(" dropped=4294967295\r\n"));
        assert!(line.len() <= MAX_STATUS_LEN);
    }
}
