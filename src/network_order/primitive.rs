//! Wire codec impls for the fixed-width primitives all DNS structures are
//! built from. Reads are bounds-checked before touching the cursor so a
//! truncated message surfaces as `MalformedWire`, never as a panic.
use std::io::Cursor;
use std::net::{Ipv4Addr, Ipv6Addr};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{DNSError, DNSResult};
use crate::network_order::{FromNetworkOrder, ToNetworkOrder};
use crate::util::remaining;

fn check_remaining(buffer: &Cursor<&[u8]>, wanted: usize, what: &str) -> DNSResult<()> {
    if remaining(buffer) < wanted {
        return Err(DNSError::wire(format!(
            "truncated buffer reading {} at offset {}",
            what,
            buffer.position()
        )));
    }
    Ok(())
}

impl ToNetworkOrder for u8 {
    /// ```
    /// use dnswire::network_order::ToNetworkOrder;
    ///
    /// let mut buffer: Vec<u8> = Vec::new();
    /// assert_eq!(255_u8.to_network_bytes(&mut buffer).unwrap(), 1);
    /// assert_eq!(buffer, &[0xFF]);
    /// ```
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> DNSResult<usize> {
        buffer.push(*self);
        Ok(1)
    }
}

impl<'a> FromNetworkOrder<'a> for u8 {
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&'a [u8]>) -> DNSResult<()> {
        check_remaining(buffer, 1, "u8")?;
        *self = buffer.read_u8()?;
        Ok(())
    }
}

impl ToNetworkOrder for u16 {
    /// ```
    /// use dnswire::network_order::ToNetworkOrder;
    ///
    /// let mut buffer: Vec<u8> = Vec::new();
    /// assert_eq!(0x1234_u16.to_network_bytes(&mut buffer).unwrap(), 2);
    /// assert_eq!(buffer, &[0x12, 0x34]);
    /// ```
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> DNSResult<usize> {
        buffer.extend_from_slice(&self.to_be_bytes());
        Ok(2)
    }
}

impl<'a> FromNetworkOrder<'a> for u16 {
    /// ```
    /// use std::io::Cursor;
    /// use dnswire::network_order::FromNetworkOrder;
    ///
    /// let b = vec![0x12, 0x34];
    /// let mut buffer = Cursor::new(b.as_slice());
    /// let mut v = 0u16;
    /// assert!(v.from_network_bytes(&mut buffer).is_ok());
    /// assert_eq!(v, 0x1234);
    /// ```
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&'a [u8]>) -> DNSResult<()> {
        check_remaining(buffer, 2, "u16")?;
        *self = buffer.read_u16::<BigEndian>()?;
        Ok(())
    }
}

impl ToNetworkOrder for u32 {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> DNSResult<usize> {
        buffer.extend_from_slice(&self.to_be_bytes());
        Ok(4)
    }
}

impl<'a> FromNetworkOrder<'a> for u32 {
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&'a [u8]>) -> DNSResult<()> {
        check_remaining(buffer, 4, "u32")?;
        *self = buffer.read_u32::<BigEndian>()?;
        Ok(())
    }
}

impl ToNetworkOrder for i32 {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> DNSResult<usize> {
        buffer.extend_from_slice(&self.to_be_bytes());
        Ok(4)
    }
}

impl<'a> FromNetworkOrder<'a> for i32 {
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&'a [u8]>) -> DNSResult<()> {
        check_remaining(buffer, 4, "i32")?;
        *self = buffer.read_i32::<BigEndian>()?;
        Ok(())
    }
}

impl ToNetworkOrder for u64 {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> DNSResult<usize> {
        buffer.extend_from_slice(&self.to_be_bytes());
        Ok(8)
    }
}

impl<'a> FromNetworkOrder<'a> for u64 {
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&'a [u8]>) -> DNSResult<()> {
        check_remaining(buffer, 8, "u64")?;
        *self = buffer.read_u64::<BigEndian>()?;
        Ok(())
    }
}

impl<const N: usize> ToNetworkOrder for [u8; N] {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> DNSResult<usize> {
        buffer.extend_from_slice(self);
        Ok(N)
    }
}

impl<'a, const N: usize> FromNetworkOrder<'a> for [u8; N] {
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&'a [u8]>) -> DNSResult<()> {
        check_remaining(buffer, N, "byte array")?;
        let pos = buffer.position() as usize;
        self.copy_from_slice(&buffer.get_ref()[pos..pos + N]);
        buffer.set_position((pos + N) as u64);
        Ok(())
    }
}

impl ToNetworkOrder for Ipv4Addr {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> DNSResult<usize> {
        buffer.extend_from_slice(&self.octets());
        Ok(4)
    }
}

impl<'a> FromNetworkOrder<'a> for Ipv4Addr {
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&'a [u8]>) -> DNSResult<()> {
        let mut octets = [0u8; 4];
        octets.from_network_bytes(buffer)?;
        *self = Ipv4Addr::from(octets);
        Ok(())
    }
}

impl ToNetworkOrder for Ipv6Addr {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> DNSResult<usize> {
        buffer.extend_from_slice(&self.octets());
        Ok(16)
    }
}

impl<'a> FromNetworkOrder<'a> for Ipv6Addr {
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&'a [u8]>) -> DNSResult<()> {
        let mut octets = [0u8; 16];
        octets.from_network_bytes(buffer)?;
        *self = Ipv6Addr::from(octets);
        Ok(())
    }
}

impl ToNetworkOrder for Vec<u8> {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> DNSResult<usize> {
        buffer.extend_from_slice(self);
        Ok(self.len())
    }
}
