use syn::{DataEnum, DeriveInput, Expr, ExprLit, ExprUnary, Ident, Lit, UnOp};

pub struct EnumMeta {
    pub repr_type: Ident,
    pub variants: Vec<VariantMeta>,
}

pub struct VariantMeta {
    pub name: Ident,
    pub discriminant: i128,
}

/// Pulls the `#[repr(...)]` integer type off an enum's attributes.
fn enum_repr_ty(attrs: &[syn::Attribute], ident: &Ident) -> syn::Result<Ident> {
    for attr in attrs {
        if attr.path().is_ident("repr") {
            let mut found = None;

            attr.parse_nested_meta(|meta| {
                if let Some(id) = meta.path.get_ident() {
                    found = Some(id.clone());
                }
                Ok(())
            })?;

            if let Some(ty) = found {
                return Ok(ty);
            }
        }
    }

    Err(syn::Error::new_spanned(
        ident,
        "WireEnum requires an explicit #[repr(uN)] attribute",
    ))
}

pub fn parse_enum(e: DataEnum, input: &DeriveInput) -> syn::Result<EnumMeta> {
    let repr_type = enum_repr_ty(&input.attrs, &input.ident)?;

    if ["isize", "usize"].iter().any(|bad| repr_type == bad) {
        return Err(syn::Error::new_spanned(
            &repr_type,
            "usize/isize are not valid wire reprs; use a fixed-width integer",
        ));
    }

    let mut discriminant_accum: i128 = -1;
    let mut variants = Vec::new();

    for variant in e.variants {
        if !matches!(variant.fields, syn::Fields::Unit) {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "WireEnum variants must not carry fields",
            ));
        }

        let discriminant = match variant.discriminant {
            Some((
                _,
                Expr::Lit(ExprLit {
                    lit: Lit::Int(discr),
                    ..
                }),
            )) => discr.base10_parse::<i128>()?,
            Some((
                _,
                Expr::Unary(ExprUnary {
                    expr,
                    op: UnOp::Neg(_),
                    ..
                }),
            )) => match *expr {
                Expr::Lit(ExprLit {
                    lit: Lit::Int(discr),
                    ..
                }) => -discr.base10_parse::<i128>()?,
                _ => {
                    return Err(syn::Error::new_spanned(
                        &variant.ident,
                        "invalid discriminant",
                    ))
                }
            },
            None => discriminant_accum + 1,
            _ => {
                return Err(syn::Error::new_spanned(
                    &variant.ident,
                    "invalid discriminant",
                ))
            }
        };

        discriminant_accum = discriminant;

        variants.push(VariantMeta {
            name: variant.ident,
            discriminant,
        });
    }

    Ok(EnumMeta {
        repr_type,
        variants,
    })
}
