//! Parsing of `#[inject]` and `#[injectable(...)]` attributes.

use syn::{DeriveInput, Field, Ident, LitStr, Meta, Path};

/// Struct-level options from `#[injectable(...)]`.
pub struct StructOptions {
    pub krate: Path,
    pub decorates: Option<Ident>,
}

impl StructOptions {
    pub fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let mut options = Self {
            krate: syn::parse_quote!(::fieldwire),
            decorates: None,
        };

        for attr in &input.attrs {
            if !attr.path().is_ident("injectable") {
                continue;
            }
            // Parse #[injectable(decorates = inner, crate = "fieldwire")]
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("decorates") {
                    options.decorates = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("crate") {
                    let value: LitStr = meta.value()?.parse()?;
                    options.krate = value.parse()?;
                    Ok(())
                } else {
                    Err(meta.error("expected `decorates = <field>` or `crate = \"<path>\"`"))
                }
            })?;
        }

        Ok(options)
    }
}

/// Role of a single struct field.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Plain,
    Marked,
    Parent,
}

impl FieldRole {
    pub fn parse(field: &Field) -> syn::Result<Self> {
        let mut role = FieldRole::Plain;

        for attr in &field.attrs {
            if !attr.path().is_ident("inject") {
                continue;
            }
            match &attr.meta {
                Meta::Path(_) => role = FieldRole::Marked,
                Meta::List(_) => {
                    attr.parse_nested_meta(|meta| {
                        if meta.path.is_ident("parent") {
                            role = FieldRole::Parent;
                            Ok(())
                        } else {
                            Err(meta.error("expected `parent`"))
                        }
                    })?;
                }
                Meta::NameValue(_) => {
                    return Err(syn::Error::new_spanned(
                        attr,
                        "expected #[inject] or #[inject(parent)]",
                    ));
                }
            }
        }

        Ok(role)
    }
}
