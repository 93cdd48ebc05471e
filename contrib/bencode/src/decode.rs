use crate::error::DecodeError;
use crate::value::Value;

/// Decodes exactly one top-level bencode value from `input`, rejecting any
/// trailing bytes after it.
pub fn decode(input: &[u8]) -> Result<Value, DecodeError> {
    let mut cursor = Cursor { input, pos: 0 };
    let value = cursor.read_value()?;
    if cursor.pos != input.len() {
        return Err(DecodeError::TrailingData(input.len() - cursor.pos));
    }
    Ok(value)
}

struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Result<u8, DecodeError> {
        self.input.get(self.pos).copied().ok_or(DecodeError::UnexpectedEof)
    }

    fn read_value(&mut self) -> Result<Value, DecodeError> {
        match self.peek()? {
            b'i' => self.read_int(),
            b'l' => self.read_list(),
            b'd' => self.read_dict(),
            b'0'..=b'9' => self.read_bytes().map(Value::Bytes),
            tag => Err(DecodeError::UnknownTag(tag, self.pos)),
        }
    }

    fn read_int(&mut self) -> Result<Value, DecodeError> {
        self.pos += 1; // 'i'
        let start = self.pos;
        while self.peek()? != b'e' {
            self.pos += 1;
        }
        let digits = std::str::from_utf8(&self.input[start..self.pos]).map_err(|_| DecodeError::InvalidInteger(start))?;
        let value: i64 = digits.parse().map_err(|_| DecodeError::InvalidInteger(start))?;
        self.pos += 1; // 'e'
        Ok(Value::Int(value))
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let start = self.pos;
        while self.peek()? != b':' {
            if !self.peek()?.is_ascii_digit() {
                return Err(DecodeError::ExpectedDigit(self.pos));
            }
            self.pos += 1;
        }
        let len: usize = std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(DecodeError::InvalidLength(start))?;
        self.pos += 1; // ':'
        let end = self.pos.checked_add(len).ok_or(DecodeError::InvalidLength(start))?;
        let bytes = self.input.get(self.pos..end).ok_or(DecodeError::UnexpectedEof)?.to_vec();
        self.pos = end;
        Ok(bytes)
    }

    fn read_list(&mut self) -> Result<Value, DecodeError> {
        self.pos += 1; // 'l'
        let mut items = Vec::new();
        while self.peek()? != b'e' {
            items.push(self.read_value()?);
        }
        self.pos += 1; // 'e'
        Ok(Value::List(items))
    }

    fn read_dict(&mut self) -> Result<Value, DecodeError> {
        self.pos += 1; // 'd'
        let mut entries = Vec::new();
        while self.peek()? != b'e' {
            let key = self.read_bytes()?;
            let value = self.read_value()?;
            entries.push((key, value));
        }
        self.pos += 1; // 'e'
        Ok(Value::Dict(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::decode;
    use crate::value::Value;

    #[test]
    fn decodes_an_integer() {
        assert_eq!(decode(b"i42e").unwrap(), Value::Int(42));
        assert_eq!(decode(b"i-7e").unwrap(), Value::Int(-7));
    }

    #[test]
    fn decodes_a_byte_string() {
        assert_eq!(decode(b"4:spam").unwrap(), Value::string("spam"));
    }

    #[test]
    fn decodes_a_list() {
        assert_eq!(decode(b"l4:spami1ee").unwrap(), Value::List(vec![Value::string("spam"), Value::Int(1)]));
    }

    #[test]
    fn decodes_a_dict_regardless_of_source_key_order() {
        let value = decode(b"d3:anti2e5:zebrai1ee").unwrap();
        assert_eq!(value.get(b"ant"), Some(&Value::Int(2)));
        assert_eq!(value.get(b"zebra"), Some(&Value::Int(1)));
    }

    #[test]
    fn rejects_trailing_bytes_after_the_top_level_value() {
        assert!(matches!(decode(b"i1eextra"), Err(super::DecodeError::TrailingData(5))));
    }

    #[test]
    fn rejects_truncated_input() {
        assert!(decode(b"4:sp").is_err());
        assert!(decode(b"i1").is_err());
        assert!(decode(b"l4:spam").is_err());
    }

    #[test]
    fn round_trips_through_encode() {
        let original = Value::dict(vec![
            (b"complete".to_vec(), Value::Int(3)),
            (b"incomplete".to_vec(), Value::Int(1)),
        ]);
        let bytes = crate::encode::encode(&original);
        assert_eq!(decode(&bytes).unwrap(), original);
    }
}
