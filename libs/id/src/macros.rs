//! Macros for defining typed ID types.

/// Macro to define a typed, opaque string ID.
///
/// This generates a newtype wrapper around `String` with:
/// - A `KIND` constant used in error messages
/// - `new()` to mint a fresh UUID-based ID
/// - `parse()` to validate an ID received from the wire
/// - `Display`, `FromStr`, `AsRef<str>` and serde implementations
///
/// The optional third argument picks the UUID rendering (`hyphenated` or
/// `simple`); it defaults to `hyphenated`.
///
/// # Example
///
/// ```ignore
/// define_id!(ServerId, "server");
/// define_id!(ProjectId, "project", simple);
///
/// let server_id = ServerId::new();
/// let parsed: ServerId = "5f7a0c1e-1c38-4f0e-9d0b-2b8f3c1a9e44".parse()?;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $kind:literal) => {
        $crate::define_id!($name, $kind, hyphenated);
    };
    ($name:ident, $kind:literal, $format:ident) => {
        /// A typed ID for this resource type.
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Human-readable resource kind, used in error messages.
            pub const KIND: &'static str = $kind;

            /// Mints a new ID from a random UUID.
            #[must_use]
            pub fn new() -> Self {
                Self($crate::Uuid::new_v4().$format().to_string())
            }

            /// Parses an ID from a string.
            ///
            /// The value must be non-empty, at most
            /// [`MAX_ID_LEN`](crate::MAX_ID_LEN) characters, and free of
            /// whitespace and `/`.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                if s.is_empty() {
                    return Err($crate::IdError::Empty { kind: Self::KIND });
                }

                if let Some(found) = s.chars().find(|c| c.is_whitespace() || *c == '/') {
                    return Err($crate::IdError::InvalidCharacter {
                        kind: Self::KIND,
                        found,
                    });
                }

                let len = s.chars().count();
                if len > $crate::MAX_ID_LEN {
                    return Err($crate::IdError::TooLong {
                        kind: Self::KIND,
                        len,
                    });
                }

                Ok(Self(s.to_string()))
            }

            /// Wraps a value without validating it. For compiled-in
            /// constants and values read back from our own store.
            #[must_use]
            pub fn from_trusted(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the ID, returning the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
