//! Record declaration macro.

/// Declares a record struct and implements [`Record`](crate::Record) for it.
///
/// Every field gets a getter named after it and a `set_<field>` setter.
/// `String` and `Option<String>` fields can hold tokens; other supported
/// field types are `bool`, `i32`, `i64`, `u32`, `u64`, `f64` and their
/// `Option`s. The type name used in storage defaults to the struct name and
/// can be overridden with `type_name = "..."`.
///
/// ```
/// use persist_token::{Record, secure_token_record};
///
/// secure_token_record! {
///     #[doc = "An API client"]
///     pub struct ApiClient type_name = "api_clients" {
///         name: String,
///         api_key: Option<String>,
///         requests: i64,
///     }
/// }
///
/// let mut client = ApiClient::default();
/// client.set_name("reporting".to_string());
/// assert_eq!(ApiClient::type_name(), "api_clients");
/// assert_eq!(client.read_attribute("name"), Some("reporting"));
/// assert_eq!(client.read_attribute("api_key"), None);
/// assert!(ApiClient::is_text_attribute("api_key"));
/// assert!(!ApiClient::is_text_attribute("requests"));
/// assert!(client.write_attribute("requests", "1".to_string()).is_err());
/// ```
#[macro_export]
macro_rules! secure_token_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident type_name = $type_name:literal
        { $($field:ident : $field_ty:ty),+ $(,)? }
    ) => {
        $crate::secure_token_record!(@impl [$(#[$meta])*] $vis $name $type_name; $($field : $field_ty),+);
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident { $($field:ident : $field_ty:ty),+ $(,)? }
    ) => {
        $crate::secure_token_record!(@impl [$(#[$meta])*] $vis $name stringify!($name); $($field : $field_ty),+);
    };
    (@impl [$(#[$meta:meta])*] $vis:vis $name:ident $type_name:expr; $($field:ident : $field_ty:ty),+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, $crate::serde::Serialize, $crate::serde::Deserialize)]
        #[serde(crate = "persist_token::serde")]
        $vis struct $name {
            $( $field: $field_ty, )+
            #[serde(skip)]
            __metadata: $crate::RecordMetadata,
        }

        $crate::paste::paste! {
            #[allow(dead_code)]
            impl $name {
                $(
                    pub fn $field(&self) -> &$field_ty {
                        &self.$field
                    }

                    pub fn [<set_ $field>](&mut self, value: $field_ty) {
                        self.$field = value;
                    }
                )+
            }
        }

        impl $crate::Record for $name {
            fn type_name() -> &'static str {
                $type_name
            }

            fn attribute_names() -> &'static [&'static str] {
                &[$(stringify!($field)),+]
            }

            fn is_text_attribute(attribute: &str) -> bool {
                match attribute {
                    $(
                        stringify!($field) => <$field_ty as $crate::AttributeValue>::TEXT,
                    )+
                    _ => false,
                }
            }

            fn read_attribute(&self, attribute: &str) -> Option<&str> {
                match attribute {
                    $(
                        stringify!($field) => $crate::AttributeValue::as_text(&self.$field),
                    )+
                    _ => None,
                }
            }

            fn write_attribute(&mut self, attribute: &str, value: String) -> $crate::Result<()> {
                match attribute {
                    $(
                        stringify!($field) => {
                            $crate::AttributeValue::assign_text(&mut self.$field, attribute, value)
                        }
                    )+
                    _ => Err($crate::TokenError::UnknownAttribute {
                        type_name: <Self as $crate::Record>::type_name().to_string(),
                        attribute: attribute.to_string(),
                    }),
                }
            }

            fn metadata(&self) -> &$crate::RecordMetadata {
                &self.__metadata
            }

            fn metadata_mut(&mut self) -> &mut $crate::RecordMetadata {
                &mut self.__metadata
            }
        }
    };
}
