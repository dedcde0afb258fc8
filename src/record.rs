//! Attribute access and persistence bookkeeping for record instances.

use crate::core::{Result, TokenError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Persistence metadata carried by every record instance.
///
/// Tracks identity, versioning and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Storage identity, assigned on first create.
    pub persist_id: Option<String>,
    /// Number of successful writes.
    pub version: i64,
    /// Timestamp of creation.
    pub created_at: Option<DateTime<Utc>>,
    /// Timestamp of last write.
    pub updated_at: Option<DateTime<Utc>>,
    /// Whether the record has been stored.
    pub persisted: bool,
}

impl RecordMetadata {
    pub fn is_new_record(&self) -> bool {
        !self.persisted
    }

    pub fn persist_id(&self) -> Option<&str> {
        self.persist_id.as_deref()
    }
}

/// A persistable record type whose string attributes can be read and
/// written by name.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Returns the unique type name of the record.
    fn type_name() -> &'static str;
    /// Returns every attribute the record declares.
    fn attribute_names() -> &'static [&'static str];
    /// Whether the attribute can hold text.
    fn is_text_attribute(attribute: &str) -> bool;
    /// Reads an attribute as text. `None` for unset, non-text or unknown attributes.
    fn read_attribute(&self, attribute: &str) -> Option<&str>;
    /// Assigns a text value to an attribute, in memory only.
    fn write_attribute(&mut self, attribute: &str, value: String) -> Result<()>;
    fn metadata(&self) -> &RecordMetadata;
    fn metadata_mut(&mut self) -> &mut RecordMetadata;

    fn has_attribute(attribute: &str) -> bool {
        Self::attribute_names().contains(&attribute)
    }

    /// True when the attribute is unset or empty.
    fn attribute_blank(&self, attribute: &str) -> bool {
        self.read_attribute(attribute).is_none_or(str::is_empty)
    }

    fn persist_id(&self) -> Option<&str> {
        self.metadata().persist_id()
    }

    fn is_new_record(&self) -> bool {
        self.metadata().is_new_record()
    }
}

/// Persists the current in-memory state of a record.
pub trait RecordUpdate<R: Record> {
    fn update_record(&self, record: &mut R) -> Result<()>;
}

/// How a field type exposes itself as a text attribute.
pub trait AttributeValue {
    /// Whether the type accepts text assignments.
    const TEXT: bool;

    fn as_text(&self) -> Option<&str>;
    fn assign_text(&mut self, attribute: &str, value: String) -> Result<()>;
}

impl AttributeValue for String {
    const TEXT: bool = true;

    fn as_text(&self) -> Option<&str> {
        Some(self.as_str())
    }

    fn assign_text(&mut self, _attribute: &str, value: String) -> Result<()> {
        *self = value;
        Ok(())
    }
}

impl AttributeValue for Option<String> {
    const TEXT: bool = true;

    fn as_text(&self) -> Option<&str> {
        self.as_deref()
    }

    fn assign_text(&mut self, _attribute: &str, value: String) -> Result<()> {
        *self = Some(value);
        Ok(())
    }
}

macro_rules! non_text_attribute {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl AttributeValue for $ty {
                const TEXT: bool = false;

                fn as_text(&self) -> Option<&str> {
                    None
                }

                fn assign_text(&mut self, attribute: &str, _value: String) -> Result<()> {
                    Err(TokenError::TypeMismatch(format!(
                        "attribute '{}' of type {} cannot hold text",
                        attribute,
                        stringify!($ty)
                    )))
                }
            }

            impl AttributeValue for Option<$ty> {
                const TEXT: bool = false;

                fn as_text(&self) -> Option<&str> {
                    None
                }

                fn assign_text(&mut self, attribute: &str, _value: String) -> Result<()> {
                    Err(TokenError::TypeMismatch(format!(
                        "attribute '{}' of type Option<{}> cannot hold text",
                        attribute,
                        stringify!($ty)
                    )))
                }
            }
        )+
    };
}

non_text_attribute!(bool, i32, i64, u32, u64, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_defaults_to_new_record() {
        let metadata = RecordMetadata::default();
        assert!(metadata.is_new_record());
        assert_eq!(metadata.persist_id(), None);
        assert_eq!(metadata.version, 0);
    }

    #[test]
    fn test_text_attribute_values() {
        let mut value: Option<String> = None;
        assert_eq!(value.as_text(), None);
        value.assign_text("token", "abc".to_string()).unwrap();
        assert_eq!(value.as_text(), Some("abc"));

        let mut plain = String::new();
        assert_eq!(plain.as_text(), Some(""));
        plain.assign_text("name", "alice".to_string()).unwrap();
        assert_eq!(plain, "alice");
    }

    #[test]
    fn test_non_text_attribute_rejects_assignment() {
        let mut score: i64 = 3;
        assert_eq!(score.as_text(), None);
        let err = score.assign_text("score", "abc".to_string()).unwrap_err();
        assert!(matches!(err, TokenError::TypeMismatch(_)));
        assert_eq!(score, 3);
    }

    #[test]
    fn test_text_capability_of_field_types() {
        assert!(<String as AttributeValue>::TEXT);
        assert!(<Option<String> as AttributeValue>::TEXT);
        assert!(!<i64 as AttributeValue>::TEXT);
        assert!(!<Option<bool> as AttributeValue>::TEXT);
    }
}
