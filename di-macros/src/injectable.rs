//! Implementation of #[derive(Injectable)] proc-macro.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

use crate::attrs::{FieldRole, StructOptions};

pub fn derive_injectable_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let owner = name.to_string();
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let options = StructOptions::parse(input)?;
    let krate = &options.krate;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Injectable can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Injectable can only be derived for structs",
            ));
        }
    };

    let mut own_fields = Vec::new();
    let mut parent = None;

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = ident.to_string();
        let field_type = &field.ty;

        match FieldRole::parse(field)? {
            FieldRole::Marked => own_fields.push(quote! {
                fields.push(#krate::FieldDescriptor::marked(#owner, #field_name, &mut self.#ident));
            }),
            FieldRole::Plain => own_fields.push(quote! {
                fields.push(#krate::FieldDescriptor::unmarked::<#field_type>(#owner, #field_name));
            }),
            FieldRole::Parent => {
                if parent.is_some() {
                    return Err(syn::Error::new_spanned(
                        field,
                        "only one #[inject(parent)] field is allowed",
                    ));
                }
                parent = Some(ident);
            }
        }
    }

    if let Some(decorates) = &options.decorates {
        if !fields.iter().any(|f| f.ident.as_ref() == Some(decorates)) {
            return Err(syn::Error::new_spanned(
                decorates,
                format!("no field named `{}` to decorate", decorates),
            ));
        }
    }

    let capacity = own_fields.len();

    // Own fields first, then the ancestor chain.
    let inherited = parent.map(|parent| {
        quote! {
            fields.extend(#krate::Injectable::fields(&mut self.#parent));
        }
    });

    // An explicit payload wins; otherwise the capability is inherited.
    let decorated = match (&options.decorates, parent) {
        (Some(payload), _) => Some(quote! {
            fn decorated(&mut self) -> ::std::option::Option<#krate::Target<'_>> {
                #krate::Scan::target(&mut self.#payload)
            }
        }),
        (None, Some(parent)) => Some(quote! {
            fn decorated(&mut self) -> ::std::option::Option<#krate::Target<'_>> {
                #krate::Injectable::decorated(&mut self.#parent)
            }
        }),
        (None, None) => None,
    };

    let expanded = quote! {
        impl #impl_generics #krate::Injectable for #name #ty_generics #where_clause {
            #[allow(unused_mut)]
            fn fields(&mut self) -> ::std::vec::Vec<#krate::FieldDescriptor<'_>> {
                let mut fields = ::std::vec::Vec::with_capacity(#capacity);
                #(#own_fields)*
                #inherited
                fields
            }

            #decorated

            fn as_injectable_mut(&mut self) -> &mut dyn #krate::Injectable {
                self
            }
        }

        impl #impl_generics #krate::Scan for #name #ty_generics #where_clause {
            fn target(&mut self) -> ::std::option::Option<#krate::Target<'_>> {
                ::std::option::Option::Some(#krate::Target::Borrowed(self))
            }
        }
    };

    Ok(expanded)
}
