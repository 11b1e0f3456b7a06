// Sequential region copy primitives.
//
// All three operate on forward-only streams with a bounded stack buffer
// and fail on any short read or write.

use std::io::{self, Read, Write};

const COPY_BUF_LEN: usize = 4096;

/// Stream exactly `count` bytes from `input` to `output` unchanged.
pub fn copy_exact<R, W>(input: &mut R, output: &mut W, count: u64) -> io::Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = [0u8; COPY_BUF_LEN];
    let mut remaining = count;
    while remaining > 0 {
        let chunk = remaining.min(COPY_BUF_LEN as u64) as usize;
        input.read_exact(&mut buf[..chunk])?;
        output.write_all(&buf[..chunk])?;
        remaining -= chunk as u64;
    }
    Ok(())
}

/// Write exactly `count` zero bytes to `output`.
pub fn zero_fill<W>(output: &mut W, count: u64) -> io::Result<()>
where
    W: Write + ?Sized,
{
    const ZERO: [u8; COPY_BUF_LEN] = [0u8; COPY_BUF_LEN];
    let mut remaining = count;
    while remaining > 0 {
        let chunk = remaining.min(COPY_BUF_LEN as u64) as usize;
        output.write_all(&ZERO[..chunk])?;
        remaining -= chunk as u64;
    }
    Ok(())
}

/// Consume and drop exactly `count` bytes from `input`.
pub fn discard<R>(input: &mut R, count: u64) -> io::Result<()>
where
    R: Read + ?Sized,
{
    let mut buf = [0u8; COPY_BUF_LEN];
    let mut remaining = count;
    while remaining > 0 {
        let chunk = remaining.min(COPY_BUF_LEN as u64) as usize;
        input.read_exact(&mut buf[..chunk])?;
        remaining -= chunk as u64;
    }
    Ok(())
}
