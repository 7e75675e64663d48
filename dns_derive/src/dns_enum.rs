// Create enum implementations for Default, TryFrom, FromStr and Display for
// DNS code enums, which are always of the same category: unit variants with
// explicit integer discriminants.
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput};

// Collect (variant name, discriminant) pairs, or panic when the macro is
// applied to something it cannot handle:
//  enum Foo { A(u8), B, C } : not all variants are unit variants
//  enum Foo { A = 1, B, C } : at least one variant has no discriminant
//  enum Foo { A = 3*4 }     : a discriminant is not an integer literal
fn get_enum_data(ast: &DeriveInput) -> Vec<(String, u16)> {
    let enum_token = if let Data::Enum(enum_token) = &ast.data {
        enum_token
    } else {
        panic!("<{}> is not an enum!", ast.ident);
    };

    let mut variant_data = Vec::new();

    for v in &enum_token.variants {
        // all enum variants should be unit variants
        if !matches!(v.fields, syn::Fields::Unit) {
            panic!(
                "variant {} for enum {} is not a unit variant!",
                v.ident, ast.ident
            );
        }

        let discriminant = v
            .discriminant
            .as_ref()
            .unwrap_or_else(|| panic!("variant {} of enum {} has no value!", v.ident, ast.ident));

        // all discriminants should be integer literals
        if let syn::Expr::Lit(expr_lit) = &discriminant.1 {
            if let syn::Lit::Int(e) = &expr_lit.lit {
                let value: u16 = e
                    .base10_parse()
                    .unwrap_or_else(|_| panic!("discriminant of {} is not a u16", v.ident));
                variant_data.push((v.ident.to_string(), value));
            } else {
                panic!(
                    "variant {} of enum {} is not an integer literal",
                    v.ident, ast.ident
                );
            }
        } else {
            panic!(
                "variant {} of enum {} is not a literal expression",
                v.ident, ast.ident
            );
        }
    }

    variant_data
}

// create code for the impls of Default, TryFrom<u8>, TryFrom<u16>, FromStr, Display
pub fn dns_enum(ast: &DeriveInput) -> TokenStream {
    // get enum data or panic
    let variant_data = get_enum_data(ast);

    // grab enum name as an ident and as a string
    let enum_name = &ast.ident;
    let enum_name_s = enum_name.to_string();

    // the first variant is the default one
    let default_variant = format_ident!("{}", variant_data[0].0);

    let try_from_u16 = variant_data.iter().map(|(name, value)| {
        let variant = format_ident!("{}", name);

        quote! {
            #value => Ok(#enum_name::#variant),
        }
    });

    let from_str = variant_data.iter().map(|(name, _)| {
        let variant = format_ident!("{}", name);

        quote! {
            #name => Ok(#enum_name::#variant),
        }
    });

    let display = variant_data.iter().map(|(name, _)| {
        let variant = format_ident!("{}", name);

        quote! {
            #enum_name::#variant => f.write_str(#name),
        }
    });

    let impls = quote! {
        impl Default for #enum_name {
            fn default() -> Self {
                #enum_name::#default_variant
            }
        }

        impl std::convert::TryFrom<u8> for #enum_name {
            type Error = String;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                <#enum_name>::try_from(value as u16)
            }
        }

        impl std::convert::TryFrom<u16> for #enum_name {
            type Error = String;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    #(#try_from_u16)*
                    _ => Err(format!("error converting u16 value <{}> to enum type {}", value, #enum_name_s)),
                }
            }
        }

        impl std::str::FromStr for #enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    #(#from_str)*
                    _ => Err(format!("error converting string '{}' to enum type {}", s, #enum_name_s)),
                }
            }
        }

        impl std::fmt::Display for #enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    #(#display)*
                }
            }
        }
    };

    // Hand the output tokens back to the compiler
    TokenStream::from(impls)
}
