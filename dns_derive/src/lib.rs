// derive macros shared by the DNS structures of the dnswire crate
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod dns_struct;
use dns_struct::dns_struct;

mod dns_enum;
use dns_enum::dns_enum;

/// Implements `ToNetworkOrder` and `FromNetworkOrder` for a struct by
/// delegating to each field in declaration order. The deriving module must
/// have both traits and `DNSResult` in scope.
#[proc_macro_derive(DnsStruct)]
pub fn dns_macro_struct(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let ast = parse_macro_input!(input as DeriveInput);

    // inject code
    dns_struct(&ast)
}

/// Implements `Default`, `TryFrom<u8>`, `TryFrom<u16>`, `FromStr` and
/// `Display` for a unit-variant enum whose variants all carry explicit
/// integer discriminants.
#[proc_macro_derive(DnsEnum)]
pub fn dns_macro_enum(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let ast = parse_macro_input!(input as DeriveInput);

    // inject code
    dns_enum(&ast)
}
