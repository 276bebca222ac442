//! Macros for defining schema enums and descriptor records.

/// Defines a wire enum with its symbolic proto names.
///
/// This generates a `#[repr(i32)]` enum deriving `prost::Enumeration` with:
/// - `ProtoEnum` (name lookup in both directions, the list of known values)
/// - `Display` using the symbolic proto name
/// - `Serialize` and `Deserialize` using the symbolic proto name
///
/// The first variant must be the zero "unspecified" value; `prost` uses it
/// as the `Default`.
///
/// # Example
///
/// ```ignore
/// proto_enum! {
///     /// Kind of thing.
///     Kind, "buf.alpha.audit.v1alpha1.Kind" {
///         Unspecified = 0 => "KIND_UNSPECIFIED",
///         Thing = 1 => "KIND_THING",
///     }
/// }
/// ```
macro_rules! proto_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $full_name:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal => $str_name:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $crate::enums::ProtoEnum for $name {
            const FULL_NAME: &'static str = $full_name;

            fn as_str_name(&self) -> &'static str {
                match self {
                    $( $name::$variant => $str_name, )+
                }
            }

            fn from_str_name(value: &str) -> Option<Self> {
                match value {
                    $( $str_name => Some($name::$variant), )+
                    _ => None,
                }
            }

            fn values() -> &'static [Self] {
                &[$( $name::$variant ),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::enums::ProtoEnum::as_str_name(self))
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str($crate::enums::ProtoEnum::as_str_name(self))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                <$name as $crate::enums::ProtoEnum>::from_str_name(&s).ok_or_else(|| {
                    ::serde::de::Error::custom(format!("unknown {} value: {}", $full_name, s))
                })
            }
        }
    };
}

pub(crate) use proto_enum;

/// Defines a `{ type, id, name }` descriptor record.
///
/// `Actor` and `Resource` share this shape and wire layout (tags 1, 2, 3) and
/// differ only in the enum carried by `type`. The generated struct keeps the
/// type as a raw `i32` so codes from newer producers survive a round trip,
/// and it keeps any fields it does not recognise.
macro_rules! define_descriptor {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name {
            #[doc = concat!("Raw `", stringify!($kind), "` code; may hold values this build does not know.")]
            pub r#type: i32,
            pub id: String,
            pub name: String,
            /// Fields read from the wire that this schema version does not define.
            pub unknown_fields: $crate::unknown::UnknownFields,
        }

        impl $name {
            /// Creates a descriptor from its typed parts.
            #[must_use]
            pub fn new(kind: $kind, id: impl Into<String>, name: impl Into<String>) -> Self {
                Self {
                    r#type: kind as i32,
                    id: id.into(),
                    name: name.into(),
                    unknown_fields: $crate::unknown::UnknownFields::new(),
                }
            }

            /// The all-defaults value, usable in `static` position.
            #[must_use]
            pub const fn empty() -> Self {
                Self {
                    r#type: 0,
                    id: String::new(),
                    name: String::new(),
                    unknown_fields: $crate::unknown::UnknownFields::new(),
                }
            }

            /// Returns the typed kind, or the unspecified value if the raw
            /// code is not known.
            #[must_use]
            pub fn r#type(&self) -> $kind {
                $kind::try_from(self.r#type).unwrap_or_default()
            }

            pub fn set_type(&mut self, value: $kind) {
                self.r#type = value as i32;
            }

            /// Symbolic name of the raw type code, or its decimal value.
            #[must_use]
            pub fn type_name(&self) -> std::borrow::Cow<'static, str> {
                $crate::enums::enum_name::<$kind>(self.r#type)
            }

            #[must_use]
            pub fn id(&self) -> &str {
                &self.id
            }

            #[must_use]
            pub fn name(&self) -> &str {
                &self.name
            }
        }

        impl ::prost::Message for $name {
            fn encode_raw(&self, buf: &mut impl ::bytes::BufMut) {
                if self.r#type != 0 {
                    ::prost::encoding::int32::encode(1, &self.r#type, buf);
                }
                if !self.id.is_empty() {
                    ::prost::encoding::string::encode(2, &self.id, buf);
                }
                if !self.name.is_empty() {
                    ::prost::encoding::string::encode(3, &self.name, buf);
                }
                self.unknown_fields.encode_raw(buf);
            }

            fn merge_field(
                &mut self,
                tag: u32,
                wire_type: ::prost::encoding::WireType,
                buf: &mut impl ::bytes::Buf,
                ctx: ::prost::encoding::DecodeContext,
            ) -> Result<(), ::prost::DecodeError> {
                const STRUCT_NAME: &str = stringify!($name);
                match tag {
                    1 => ::prost::encoding::int32::merge(wire_type, &mut self.r#type, buf, ctx)
                        .map_err(|mut error| {
                            error.push(STRUCT_NAME, "type");
                            error
                        }),
                    2 => ::prost::encoding::string::merge(wire_type, &mut self.id, buf, ctx)
                        .map_err(|mut error| {
                            error.push(STRUCT_NAME, "id");
                            error
                        }),
                    3 => ::prost::encoding::string::merge(wire_type, &mut self.name, buf, ctx)
                        .map_err(|mut error| {
                            error.push(STRUCT_NAME, "name");
                            error
                        }),
                    _ => self.unknown_fields.merge_field(tag, wire_type, buf),
                }
            }

            fn encoded_len(&self) -> usize {
                let mut len = 0;
                if self.r#type != 0 {
                    len += ::prost::encoding::int32::encoded_len(1, &self.r#type);
                }
                if !self.id.is_empty() {
                    len += ::prost::encoding::string::encoded_len(2, &self.id);
                }
                if !self.name.is_empty() {
                    len += ::prost::encoding::string::encoded_len(3, &self.name);
                }
                len + self.unknown_fields.encoded_len()
            }

            fn clear(&mut self) {
                self.r#type = 0;
                self.id.clear();
                self.name.clear();
                self.unknown_fields.clear();
            }
        }
    };
}

pub(crate) use define_descriptor;
