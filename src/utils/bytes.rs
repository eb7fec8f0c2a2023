//! Little-endian framing helpers shared by the binary persistence format.
//!
//! All multi-byte integers are little-endian; strings, blobs and lists are
//! length-prefixed. Keeping the framing in one place avoids scattered byte
//! fiddling across the persistence code.

use std::io::{self, Read, Write};

pub fn write_u8<W: Write>(w: &mut W, v: u8) -> io::Result<()> {
    w.write_all(&[v])
}

pub fn read_u8<R: Read>(r: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn write_u32<W: Write>(w: &mut W, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn write_u64<W: Write>(w: &mut W, v: u64) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

pub fn write_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    write_u64(w, bytes.len() as u64)?;
    w.write_all(bytes)
}

pub fn read_bytes<R: Read>(r: &mut R) -> io::Result<Vec<u8>> {
    let len = read_u64(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn write_string<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    write_bytes(w, s.as_bytes())
}

pub fn read_string<R: Read>(r: &mut R) -> io::Result<String> {
    let bytes = read_bytes(r)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn write_string_list<W: Write>(w: &mut W, list: &[String]) -> io::Result<()> {
    write_u32(w, list.len() as u32)?;
    for s in list {
        write_string(w, s)?;
    }
    Ok(())
}

pub fn read_string_list<R: Read>(r: &mut R) -> io::Result<Vec<String>> {
    let len = read_u32(r)? as usize;
    let mut list = Vec::with_capacity(len);
    for _ in 0..len {
        list.push(read_string(r)?);
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_round_trip() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 7).unwrap();
        write_string(&mut buf, "subgraph_0").unwrap();
        write_string_list(&mut buf, &["w0".to_string(), "b0".to_string()]).unwrap();
        write_bytes(&mut buf, &[1, 2, 3]).unwrap();

        let mut r = buf.as_slice();
        assert_eq!(read_u32(&mut r).unwrap(), 7);
        assert_eq!(read_string(&mut r).unwrap(), "subgraph_0");
        assert_eq!(read_string_list(&mut r).unwrap(), vec!["w0", "b0"]);
        assert_eq!(read_bytes(&mut r).unwrap(), vec![1, 2, 3]);
        assert!(r.is_empty());
    }

    #[test]
    fn test_truncated_stream_errors() {
        let mut buf = Vec::new();
        write_string(&mut buf, "subgraph_0").unwrap();
        buf.truncate(buf.len() - 2);

        let mut r = buf.as_slice();
        assert!(read_string(&mut r).is_err());
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut buf = Vec::new();
        write_bytes(&mut buf, &[0xff, 0xfe]).unwrap();

        let mut r = buf.as_slice();
        assert!(read_string(&mut r).is_err());
    }
}
