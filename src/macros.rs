// Macros shared by the whole crate: the open code-enum builder used for the
// IANA registries that must carry unassigned code points losslessly, and a
// couple of helpers for wire tests.

/// Build an open 16-bit code enum: all registered mnemonics as unit variants
/// plus an `Unknown(u16)` carrier, with total `From<u16>`, the RFC 3597
/// generic text form (`TYPE65534`, `CLASS254`) on parse and display, and the
/// wire codec impls.
///
/// Closed enums (opcode, rcode, ...) use the `DnsEnum` derive instead; this
/// macro is for registries where an unassigned code is data, not an error.
#[macro_export]
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($prefix:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
            /// Code point without a registered mnemonic.
            Unknown(u16),
        }

        impl $name {
            /// The 16-bit registry code.
            pub fn code(&self) -> u16 {
                match self {
                    $( $name::$variant => $value, )*
                    $name::Unknown(code) => *code,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::Unknown(0)
            }
        }

        impl From<u16> for $name {
            fn from(value: u16) -> Self {
                match value {
                    $( $value => $name::$variant, )*
                    _ => $name::Unknown(value),
                }
            }
        }

        impl From<$name> for u16 {
            fn from(value: $name) -> Self {
                value.code()
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( stringify!($variant) => Ok($name::$variant), )*
                    _ => match s.strip_prefix($prefix) {
                        Some(digits) => digits
                            .parse::<u16>()
                            .map($name::from)
                            .map_err(|_| format!("bad generic form '{}' for {}", s, stringify!($name))),
                        None => Err(format!("unknown {} mnemonic '{}'", stringify!($name), s)),
                    },
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $( $name::$variant => f.write_str(stringify!($variant)), )*
                    $name::Unknown(code) => write!(f, "{}{}", $prefix, code),
                }
            }
        }

        impl $crate::network_order::ToNetworkOrder for $name {
            fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> $crate::error::DNSResult<usize> {
                buffer.extend_from_slice(&self.code().to_be_bytes());
                Ok(2)
            }
        }

        impl<'a> $crate::network_order::FromNetworkOrder<'a> for $name {
            fn from_network_bytes(
                &mut self,
                buffer: &mut std::io::Cursor<&'a [u8]>,
            ) -> $crate::error::DNSResult<()> {
                let mut value = 0u16;
                <u16 as $crate::network_order::FromNetworkOrder>::from_network_bytes(&mut value, buffer)?;
                *self = Self::from(value);
                Ok(())
            }
        }
    };
}

// useful helpers for wire tests
#[macro_export]
macro_rules! test_from_network {
    ($slice:ident, $t:ty) => {{
        let s = crate::util::get_sample_slice($slice);
        let mut buffer = std::io::Cursor::new(s.as_slice());
        let mut v = <$t>::default();
        assert!(v.from_network_bytes(&mut buffer).is_ok());
        v
    }};
}

#[macro_export]
macro_rules! test_to_network {
    ($data:ident) => {{
        let mut buffer: Vec<u8> = Vec::new();
        let bytes_written = $data.to_network_bytes(&mut buffer).unwrap();

        (buffer, bytes_written)
    }};
}
