//! Retention of wire fields the current schema does not define.
//!
//! A record written by a newer producer may carry fields (including payload
//! variants) under tags this build has never heard of. They are kept here in
//! arrival order and written back after the known fields, so a consumer can
//! forward the record without losing anything.
//!
//! Re-encoding is byte-identical for records written in canonical tag order,
//! which is what every protobuf encoder emits. A record that places an
//! unknown tag before a known one comes back out with the known fields first;
//! the field values are unchanged.

use bytes::{Buf, BufMut};
use prost::encoding::{
    decode_key, decode_varint, encode_key, encode_varint, encoded_len_varint, key_len, WireType,
};
use prost::DecodeError;

/// Maximum nesting of unknown groups accepted while decoding.
pub const RECURSION_LIMIT: u32 = 100;

/// A single value as it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownValue {
    Varint(u64),
    Fixed64(u64),
    LengthDelimited(Vec<u8>),
    Group(UnknownFields),
    Fixed32(u32),
}

impl UnknownValue {
    /// The wire type this value is encoded with.
    pub fn wire_type(&self) -> WireType {
        match self {
            UnknownValue::Varint(_) => WireType::Varint,
            UnknownValue::Fixed64(_) => WireType::SixtyFourBit,
            UnknownValue::LengthDelimited(_) => WireType::LengthDelimited,
            UnknownValue::Group(_) => WireType::StartGroup,
            UnknownValue::Fixed32(_) => WireType::ThirtyTwoBit,
        }
    }
}

/// An unrecognised tag together with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField {
    pub tag: u32,
    pub value: UnknownValue,
}

impl UnknownField {
    fn encode(&self, buf: &mut impl BufMut) {
        encode_key(self.tag, self.value.wire_type(), buf);
        match &self.value {
            UnknownValue::Varint(value) => encode_varint(*value, buf),
            UnknownValue::Fixed64(value) => buf.put_u64_le(*value),
            UnknownValue::LengthDelimited(data) => {
                encode_varint(data.len() as u64, buf);
                buf.put_slice(data);
            }
            UnknownValue::Group(fields) => {
                fields.encode_raw(buf);
                encode_key(self.tag, WireType::EndGroup, buf);
            }
            UnknownValue::Fixed32(value) => buf.put_u32_le(*value),
        }
    }

    fn encoded_len(&self) -> usize {
        let value_len = match &self.value {
            UnknownValue::Varint(value) => encoded_len_varint(*value),
            UnknownValue::Fixed64(_) => 8,
            UnknownValue::LengthDelimited(data) => {
                encoded_len_varint(data.len() as u64) + data.len()
            }
            UnknownValue::Group(fields) => fields.encoded_len() + key_len(self.tag),
            UnknownValue::Fixed32(_) => 4,
        };
        key_len(self.tag) + value_len
    }
}

/// Unrecognised fields of one message, in the order they were read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFields {
    fields: Vec<UnknownField>,
}

impl UnknownFields {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnknownField> {
        self.fields.iter()
    }

    /// Returns true if any retained field has the given tag.
    pub fn contains_tag(&self, tag: u32) -> bool {
        self.fields.iter().any(|field| field.tag == tag)
    }

    /// Values retained under `tag`, in arrival order.
    pub fn get(&self, tag: u32) -> impl Iterator<Item = &UnknownValue> {
        self.fields
            .iter()
            .filter(move |field| field.tag == tag)
            .map(|field| &field.value)
    }

    pub fn push(&mut self, tag: u32, value: UnknownValue) {
        self.fields.push(UnknownField { tag, value });
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Reads the value for a key that has already been consumed from `buf`.
    pub(crate) fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), DecodeError> {
        let value = read_value(tag, wire_type, buf, RECURSION_LIMIT)?;
        self.push(tag, value);
        Ok(())
    }

    pub(crate) fn encode_raw(&self, buf: &mut impl BufMut) {
        for field in &self.fields {
            field.encode(buf);
        }
    }

    pub(crate) fn encoded_len(&self) -> usize {
        self.fields.iter().map(UnknownField::encoded_len).sum()
    }
}

impl<'a> IntoIterator for &'a UnknownFields {
    type Item = &'a UnknownField;
    type IntoIter = std::slice::Iter<'a, UnknownField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

fn read_value(
    tag: u32,
    wire_type: WireType,
    buf: &mut impl Buf,
    depth: u32,
) -> Result<UnknownValue, DecodeError> {
    match wire_type {
        WireType::Varint => Ok(UnknownValue::Varint(decode_varint(buf)?)),
        WireType::SixtyFourBit => {
            if buf.remaining() < 8 {
                return Err(DecodeError::new("buffer underflow"));
            }
            Ok(UnknownValue::Fixed64(buf.get_u64_le()))
        }
        WireType::ThirtyTwoBit => {
            if buf.remaining() < 4 {
                return Err(DecodeError::new("buffer underflow"));
            }
            Ok(UnknownValue::Fixed32(buf.get_u32_le()))
        }
        WireType::LengthDelimited => {
            let len = decode_varint(buf)?;
            if len > buf.remaining() as u64 {
                return Err(DecodeError::new("buffer underflow"));
            }
            let mut data = vec![0; len as usize];
            buf.copy_to_slice(&mut data);
            Ok(UnknownValue::LengthDelimited(data))
        }
        WireType::StartGroup => {
            if depth == 0 {
                return Err(DecodeError::new("recursion limit reached"));
            }
            let mut group = UnknownFields::new();
            loop {
                if !buf.has_remaining() {
                    return Err(DecodeError::new("unterminated group"));
                }
                let (field_tag, field_wire_type) = decode_key(buf)?;
                if field_wire_type == WireType::EndGroup {
                    if field_tag != tag {
                        return Err(DecodeError::new("unexpected end group tag"));
                    }
                    return Ok(UnknownValue::Group(group));
                }
                let value = read_value(field_tag, field_wire_type, buf, depth - 1)?;
                group.push(field_tag, value);
            }
        }
        WireType::EndGroup => Err(DecodeError::new("unexpected end group tag")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(mut bytes: &[u8]) -> Result<UnknownFields, DecodeError> {
        let mut fields = UnknownFields::new();
        while bytes.has_remaining() {
            let (tag, wire_type) = decode_key(&mut bytes)?;
            fields.merge_field(tag, wire_type, &mut bytes)?;
        }
        Ok(fields)
    }

    #[test]
    fn test_every_wire_type_survives() {
        let mut input = Vec::new();
        encode_key(9, WireType::Varint, &mut input);
        encode_varint(300, &mut input);
        encode_key(10, WireType::SixtyFourBit, &mut input);
        input.put_u64_le(0xdead_beef_0000_0001);
        encode_key(11, WireType::LengthDelimited, &mut input);
        encode_varint(3, &mut input);
        input.put_slice(b"abc");
        encode_key(12, WireType::StartGroup, &mut input);
        encode_key(1, WireType::Varint, &mut input);
        encode_varint(7, &mut input);
        encode_key(12, WireType::EndGroup, &mut input);
        encode_key(13, WireType::ThirtyTwoBit, &mut input);
        input.put_u32_le(42);

        let fields = read_all(&input).unwrap();
        assert_eq!(fields.len(), 5);
        assert_eq!(
            fields.get(11).collect::<Vec<_>>(),
            vec![&UnknownValue::LengthDelimited(b"abc".to_vec())]
        );
        assert!(fields.contains_tag(12));
        assert!(!fields.contains_tag(1));

        let mut output = Vec::new();
        fields.encode_raw(&mut output);
        assert_eq!(output, input);
        assert_eq!(fields.encoded_len(), input.len());
    }

    #[test]
    fn test_truncated_length_delimited_is_rejected() {
        let mut input = Vec::new();
        encode_key(11, WireType::LengthDelimited, &mut input);
        encode_varint(10, &mut input);
        input.put_slice(b"short");
        assert!(read_all(&input).is_err());
    }

    #[test]
    fn test_mismatched_end_group_is_rejected() {
        let mut input = Vec::new();
        encode_key(12, WireType::StartGroup, &mut input);
        encode_key(13, WireType::EndGroup, &mut input);
        assert!(read_all(&input).is_err());
    }

    #[test]
    fn test_group_nesting_is_bounded() {
        let mut input = Vec::new();
        for _ in 0..=RECURSION_LIMIT {
            encode_key(12, WireType::StartGroup, &mut input);
        }
        for _ in 0..=RECURSION_LIMIT {
            encode_key(12, WireType::EndGroup, &mut input);
        }
        let err = read_all(&input).unwrap_err();
        assert!(err.to_string().contains("recursion limit reached"));
    }
}
