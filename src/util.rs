use crate::Error;

/// Keys and prefixes must be strictly shorter than this many bytes.
pub const MAX_KEY_LENGTH: usize = 256;

/// Checks a key or prefix against [`MAX_KEY_LENGTH`].
///
/// Every operation that takes a key runs this before touching any node, so a
/// rejected call leaves the tree exactly as it was.
pub fn check_key(key: &[u8]) -> Result<&[u8], Error> {
    if key.len() >= MAX_KEY_LENGTH {
        return Err(Error::KeyTooLong { len: key.len() });
    }
    Ok(key)
}
