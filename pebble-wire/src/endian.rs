/// Byte order a field or packet resolves to before it is written or read.
///
/// Resolution order (narrowest wins): a field-local override, then the
/// packet's declared default, then whatever default the caller supplies.
/// Pebble Protocol packets default to big-endian; a handful (`AppMessage`,
/// `MusicControl`, `SystemMessage`, ...) declare themselves little-endian.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}
