use thiserror::Error;

/// Largest supported universe width, in bits.
pub const MAX_UNIVERSE_BITS: u32 = u64::BITS;

/// Errors returned by the fallible constructors and inserts.
///
/// The panicking twins (`VebTree::new`, `VebTree::insert`) treat these as
/// programming errors instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("universe width {bits} exceeds the supported maximum of {MAX_UNIVERSE_BITS} bits")]
    WidthTooLarge { bits: u32 },
    #[error("value {value} does not fit in a {bits}-bit universe")]
    OutOfRange { value: u64, bits: u32 },
}
