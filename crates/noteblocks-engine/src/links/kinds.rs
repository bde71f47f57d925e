/// Delimiters of the wikilink dialect.
pub struct WikiLink;

impl WikiLink {
    pub const OPEN: &'static [u8; 2] = b"[[";
    pub const CLOSE: &'static [u8; 2] = b"]]";
    pub const DISPLAY: char = '|';
    pub const ID_PREFIX: &'static str = "id:";

    /// Bytes that may not appear inside a link payload.
    pub fn is_payload_stop(b: u8) -> bool {
        matches!(b, b'[' | b']' | b'\n')
    }
}
