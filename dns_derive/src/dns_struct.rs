// generate the wire codec impls for a plain DNS structure
use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DataStruct, DeriveInput};

// verify the derive macro is applied to a non-generic structure
fn get_struct(ast: &DeriveInput) -> &DataStruct {
    if !ast.generics.params.is_empty() {
        panic!("DnsStruct cannot be derived for generic type <{}>", ast.ident);
    }

    if let Data::Struct(struct_token) = &ast.data {
        struct_token
    } else {
        panic!("<{}> is not a struct!", ast.ident);
    }
}

// create the impls of the ToNetworkOrder & FromNetworkOrder traits
pub fn dns_struct(ast: &DeriveInput) -> TokenStream {
    // get struct data or panic
    let struct_token = get_struct(ast);

    // save structure name because we're gonna use it soon
    let structure_name = &ast.ident;

    // to_network_bytes() call for each field
    let to_method_calls = struct_token.fields.iter().map(|f| {
        // get name of the field as TokenStream
        let field_name = f.ident.as_ref().unwrap();

        quote! {
            length += ToNetworkOrder::to_network_bytes(&self.#field_name, buffer)?;
        }
    });

    // from_network_bytes() call for each field
    let from_method_calls = struct_token.fields.iter().map(|f| {
        // get name of the field as TokenStream
        let field_name = f.ident.as_ref().unwrap();

        quote! {
            FromNetworkOrder::from_network_bytes(&mut self.#field_name, buffer)?;
        }
    });

    let new_code = quote! {
        // the generated impl.
        impl ToNetworkOrder for #structure_name {
            fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> DNSResult<usize> {
                let mut length = 0usize;
                #( #to_method_calls)*
                Ok(length)
            }
        }

        impl<'a> FromNetworkOrder<'a> for #structure_name {
            fn from_network_bytes(&mut self, buffer: &mut std::io::Cursor<&'a [u8]>) -> DNSResult<()> {
                #( #from_method_calls)*
                Ok(())
            }
        }
    };

    // Hand the output tokens back to the compiler
    TokenStream::from(new_code)
}
