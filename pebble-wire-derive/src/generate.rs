use crate::parse::EnumMeta;
use proc_macro2::TokenStream;
use quote::quote;
use std::str::FromStr;
use syn::DeriveInput;

pub fn generate_enum(parsed: EnumMeta, input: &DeriveInput) -> TokenStream {
    let name = &input.ident;
    let repr_type = parsed.repr_type;

    let to_repr_arms = parsed.variants.iter().map(|v| {
        let discr = TokenStream::from_str(&v.discriminant.to_string()).unwrap();
        let variant_name = &v.name;
        quote! { Self::#variant_name => #discr, }
    });

    let from_repr_arms = parsed.variants.iter().map(|v| {
        let discr = TokenStream::from_str(&v.discriminant.to_string()).unwrap();
        let variant_name = &v.name;
        quote! { #discr => Some(Self::#variant_name), }
    });

    quote! {
        impl ::pebble_wire::WireEnum for #name {
            type Repr = #repr_type;

            const NAME: &'static str = stringify!(#name);

            fn to_repr(&self) -> Self::Repr {
                match *self {
                    #(#to_repr_arms)*
                }
            }

            fn from_repr(raw: Self::Repr) -> Option<Self> {
                match raw {
                    #(#from_repr_arms)*
                    _ => None,
                }
            }
        }
    }
}
