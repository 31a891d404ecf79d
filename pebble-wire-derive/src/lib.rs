//! Derive macro for `WireEnum`, used on plain fieldless enums that sit on the
//! wire as a single fixed-width integer: status codes, object kinds, message
//! kinds. Anything with a length, count, tag, or other dependent field is
//! written by hand against `pebble_wire::{Reader, Writer}` instead — see
//! `pebble-protocol`'s `packets` module.

mod generate;
mod parse;

use parse::parse_enum;
use proc_macro::TokenStream;
use syn::{parse_macro_input, Data, DeriveInput};

/// Derives `WireEnum` for a fieldless `#[repr(uN)]` enum.
///
/// ```ignore
/// #[derive(Copy, Clone, Debug, PartialEq, Eq, WireEnum)]
/// #[repr(u8)]
/// enum ObjectType {
///     Firmware = 1,
///     Recovery = 2,
/// }
/// ```
#[proc_macro_derive(WireEnum)]
pub fn wire_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let result = match input.data.clone() {
        Data::Enum(e) => parse_enum(e, &input).map(|parsed| generate::generate_enum(parsed, &input)),
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            "WireEnum can only be derived for fieldless enums",
        )),
    };

    match result {
        Ok(tokens) => TokenStream::from(tokens),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}
