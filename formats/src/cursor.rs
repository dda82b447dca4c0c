//! Bounds-checked little-endian reader over an in-memory buffer
//!
//! Every decoder in this crate reads exclusively through [`BinaryCursor`].
//! A read that would run past the end of the buffer fails with
//! [`FormatError::OutOfBounds`] and leaves the position untouched.

use glam::{Quat, Vec2, Vec3};

use crate::error::FormatError;

/// Little-endian cursor over a borrowed byte slice
#[derive(Debug, Clone)]
pub struct BinaryCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current absolute position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total buffer length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the position and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move to an absolute offset. Seeking exactly to the end is allowed.
    pub fn seek(&mut self, offset: usize) -> Result<(), FormatError> {
        if offset > self.data.len() {
            return Err(self.out_of_bounds(offset, 0));
        }
        self.pos = offset;
        Ok(())
    }

    /// Advance by `n` bytes without reading them
    pub fn skip(&mut self, n: usize) -> Result<(), FormatError> {
        self.take(n).map(|_| ())
    }

    /// Borrow the next `n` bytes and advance past them
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        self.take(n)
    }

    /// Read a fixed-size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, FormatError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, FormatError> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, FormatError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, FormatError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, FormatError> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read a fixed-width character block (NUL padding is kept)
    pub fn read_fixed_chars(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        self.take(n)
    }

    pub fn read_vec2(&mut self) -> Result<Vec2, FormatError> {
        Ok(Vec2::from_array(self.read_f32s()?))
    }

    pub fn read_vec3(&mut self) -> Result<Vec3, FormatError> {
        Ok(Vec3::from_array(self.read_f32s()?))
    }

    /// Read a quaternion stored as x, y, z, w
    pub fn read_quat(&mut self) -> Result<Quat, FormatError> {
        Ok(Quat::from_array(self.read_f32s()?))
    }

    /// Capacity to reserve for `count` records of `record_size` bytes.
    ///
    /// Never more than the records that could still fit in the buffer, so a
    /// corrupt count fails on the first missing record instead of allocating.
    pub fn capacity_for(&self, count: usize, record_size: usize) -> usize {
        count.min(self.remaining() / record_size.max(1))
    }

    /// `N` consecutive floats, bounds-checked as one read
    fn read_f32s<const N: usize>(&mut self) -> Result<[f32; N], FormatError> {
        let bytes = self.take(N * 4)?;
        let mut out = [0.0; N];
        for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(out)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| self.out_of_bounds(self.pos, n))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn out_of_bounds(&self, offset: usize, len: usize) -> FormatError {
        FormatError::OutOfBounds {
            offset,
            len,
            buffer_len: self.data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_are_little_endian() {
        let data = [
            0x01, // u8
            0x34, 0x12, // u16
            0xFE, 0xFF, // i16 = -2
            0x78, 0x56, 0x34, 0x12, // u32
            0xFF, 0xFF, 0xFF, 0xFF, // i32 = -1
        ];
        let mut cursor = BinaryCursor::new(&data);
        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
        assert_eq!(cursor.read_i16().unwrap(), -2);
        assert_eq!(cursor.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(cursor.read_i32().unwrap(), -1);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_read_f32() {
        let data = 1.5f32.to_le_bytes();
        let mut cursor = BinaryCursor::new(&data);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
    }

    #[test]
    fn test_out_of_bounds_leaves_position() {
        let data = [0u8; 3];
        let mut cursor = BinaryCursor::new(&data);
        cursor.skip(1).unwrap();
        let err = cursor.read_u32().unwrap_err();
        assert_eq!(
            err,
            FormatError::OutOfBounds {
                offset: 1,
                len: 4,
                buffer_len: 3
            }
        );
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.read_u16().unwrap(), 0);
    }

    #[test]
    fn test_seek() {
        let data = [0u8, 1, 2, 3];
        let mut cursor = BinaryCursor::new(&data);
        cursor.seek(2).unwrap();
        assert_eq!(cursor.read_u8().unwrap(), 2);

        // Seeking to the end is fine, past it is not
        cursor.seek(4).unwrap();
        assert!(cursor.read_u8().is_err());
        assert!(cursor.seek(5).is_err());
    }

    #[test]
    fn test_skip_overflow() {
        let data = [0u8; 4];
        let mut cursor = BinaryCursor::new(&data);
        cursor.skip(2).unwrap();
        assert!(cursor.skip(usize::MAX).is_err());
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_read_fixed_chars_keeps_padding() {
        let data = *b"abc\0\0\0";
        let mut cursor = BinaryCursor::new(&data);
        assert_eq!(cursor.read_fixed_chars(6).unwrap(), b"abc\0\0\0");
    }

    #[test]
    fn test_read_quat_order() {
        let mut data = Vec::new();
        for v in [0.1f32, 0.2, 0.3, 0.9] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut cursor = BinaryCursor::new(&data);
        let q = cursor.read_quat().unwrap();
        assert_eq!((q.x, q.y, q.z, q.w), (0.1, 0.2, 0.3, 0.9));
    }

    #[test]
    fn test_truncated_vector_leaves_position() {
        // Two and a half floats: a vec3 read must not consume the first two
        let data = [0u8; 10];
        let mut cursor = BinaryCursor::new(&data);
        let err = cursor.read_vec3().unwrap_err();
        assert_eq!(
            err,
            FormatError::OutOfBounds {
                offset: 0,
                len: 12,
                buffer_len: 10
            }
        );
        assert_eq!(cursor.position(), 0);
        assert!(cursor.read_quat().is_err());
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read_vec2().unwrap(), Vec2::ZERO);
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn test_capacity_for_is_bounded_by_remaining() {
        let data = [0u8; 100];
        let mut cursor = BinaryCursor::new(&data);
        assert_eq!(cursor.capacity_for(3, 12), 3);
        assert_eq!(cursor.capacity_for(1_000_000, 12), 8);
        cursor.seek(100).unwrap();
        assert_eq!(cursor.capacity_for(1_000_000, 12), 0);
        assert_eq!(cursor.capacity_for(5, 0), 0);
    }
}
