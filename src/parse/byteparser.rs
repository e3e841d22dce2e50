use super::buffer::VecBuffer;
use super::error::{OverrunError, ParseError, ParseResult};
use super::Parser;

/// `Parser` over an owned [`VecBuffer`] with a forward-moving offset
#[derive(Debug)]
pub struct ByteParser {
    buffer: VecBuffer,
    offset: usize,
}

impl ByteParser {
    /// Returns the unconsumed bytes of the buffer
    pub fn residue(&self) -> &[u8] {
        self.buffer.tail(self.offset)
    }

    fn overrun(&self, requested: usize) -> ParseError {
        OverrunError {
            offset: self.offset,
            requested,
            available: self.remainder(),
        }
        .into()
    }
}

impl Parser for ByteParser {
    type Buffer = VecBuffer;

    /// Creates a `ByteParser` with an offset of 0.
    fn from_buffer(buffer: Self::Buffer) -> Self {
        Self { buffer, offset: 0 }
    }

    #[inline]
    fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset
    }

    fn consume_byte(&mut self) -> ParseResult<u8> {
        match self.buffer.get_byte(self.offset) {
            Some(byte) => {
                self.offset += 1;
                Ok(byte)
            }
            None => Err(self.overrun(1)),
        }
    }

    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]> {
        if nbytes > self.remainder() {
            return Err(self.overrun(nbytes));
        }
        let ix = self.offset;
        self.offset += nbytes;
        self.buffer
            .get_slice(ix, nbytes)
            .ok_or(ParseError::Overrun(OverrunError {
                offset: ix,
                requested: nbytes,
                available: 0,
            }))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn forward_cursor() {
        let mut p = ByteParser::from_buffer(VecBuffer::from([1, 2, 3, 4, 5]));
        assert_eq!(p.consume(2).unwrap(), &[1, 2]);
        assert_eq!(p.offset(), 2);
        assert_eq!(p.remainder(), 3);
        assert_eq!(p.residue(), &[3, 4, 5]);
        assert_eq!(p.consume_byte().unwrap(), 3);
        assert_eq!(p.cleanup(), 2);
    }

    #[test]
    fn overrun_consumes_nothing() {
        let mut p = ByteParser::from_buffer(VecBuffer::from([7u8, 8]));
        assert!(matches!(
            p.consume(3),
            Err(ParseError::Overrun(OverrunError {
                offset: 0,
                requested: 3,
                available: 2,
            }))
        ));
        assert_eq!(p.offset(), 0);
        assert_eq!(p.consume(2).unwrap(), &[7, 8]);
        assert_eq!(
            p.consume_byte().unwrap_err().to_string(),
            "cannot consume 1 bytes at offset 2: only 0 remain"
        );
    }
}
