/// Builds a [`Value`](crate::Value) tree from JSON-like syntax.
///
/// ```rust
/// use serde_codable::{value, Value};
///
/// let retailer = value!({
///     "name": "Farmer's Market",
///     "open": true,
///     "stalls": [1, 2, 3],
///     "owner": null
/// });
/// assert_eq!(retailer.get("open"), Some(&Value::Bool(true)));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(::std::vec::Vec::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::Map::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::Map::new();
        $(
            object.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::Object(object)
    }};

    // Numbers, strings and any expression with a `From` impl.
    ($other:expr) => {
        $crate::Value::from($other)
    };
}

/// Declares a key enum whose variants carry fixed string names, and
/// implements [`CodingKey`](crate::CodingKey) for it.
///
/// The enum derives `Clone`, `Copy`, `Debug`, `PartialEq`, `Eq` and `Hash`,
/// and gets an `ALL` constant listing every variant in declaration order.
///
/// ```rust
/// use serde_codable::{coding_keys, CodingKey};
///
/// coding_keys! {
///     pub enum VegetableKey {
///         Name = "name",
///         WaterContent = "water_content",
///     }
/// }
///
/// assert_eq!(VegetableKey::WaterContent.name(), "water_content");
/// assert_eq!(VegetableKey::from_name("name"), Some(VegetableKey::Name));
/// assert_eq!(VegetableKey::from_name("color"), None);
/// assert_eq!(VegetableKey::ALL.len(), 2);
/// ```
#[macro_export]
macro_rules! coding_keys {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $raw:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )*
        }

        impl $name {
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub const fn raw_value(&self) -> &'static str {
                match self {
                    $( $name::$variant => $raw, )*
                }
            }
        }

        impl $crate::CodingKey for $name {
            fn name(&self) -> ::std::borrow::Cow<'_, str> {
                ::std::borrow::Cow::Borrowed(self.raw_value())
            }

            fn from_name(name: &str) -> ::std::option::Option<Self> {
                match name {
                    $( $raw => ::std::option::Option::Some($name::$variant), )*
                    _ => ::std::option::Option::None,
                }
            }

            fn declared_names() -> &'static [&'static str] {
                &[$($raw),*]
            }

            fn to_key(&self) -> $crate::Key {
                $crate::Key::fixed(self.raw_value())
            }
        }
    };
}

/// Declares a struct and derives [`Encode`](crate::Encode) and
/// [`Decode`](crate::Decode) for it.
///
/// Each field is written under its own name, or under the name given with
/// `field as "name": Type`. `Option` fields are omitted when `None` and may
/// be missing (or null) in the input.
///
/// ```rust
/// use serde_codable::{codable, from_str, to_string};
///
/// codable! {
///     #[derive(Debug, PartialEq)]
///     pub struct Vegetable {
///         pub name: String,
///         pub water_content as "waterContent": f64,
///         pub color: Option<String>,
///     }
/// }
///
/// let carrot = Vegetable { name: "Carrot".into(), water_content: 88.0, color: None };
/// let json = to_string(&carrot).unwrap();
/// assert_eq!(json, r#"{"name":"Carrot","waterContent":88.0}"#);
/// assert_eq!(from_str::<Vegetable>(&json).unwrap(), carrot);
/// ```
#[macro_export]
macro_rules! codable {
    (@key $field:ident $key:literal) => {
        $key
    };

    (@key $field:ident) => {
        ::std::stringify!($field)
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident $(as $key:literal)? : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        impl $crate::Fields for $name {
            const FIELDS: &'static [&'static str] = &[$($crate::codable!(@key $field $($key)?)),*];
        }

        impl $crate::Encode for $name {
            fn encode(&self, encoder: &mut $crate::Encoder<'_>) -> $crate::Result<()> {
                #[allow(unused_mut, unused_variables)]
                let mut container = encoder.container::<$crate::FieldKey<Self>>()?;
                $(
                    container.encode_field(
                        &self.$field,
                        &$crate::FieldKey::new($crate::codable!(@key $field $($key)?)),
                    )?;
                )*
                ::std::result::Result::Ok(())
            }
        }

        impl $crate::Decode for $name {
            fn decode(decoder: &$crate::Decoder<'_>) -> $crate::Result<Self> {
                #[allow(unused_variables)]
                let container = decoder.container::<$crate::FieldKey<Self>>()?;
                ::std::result::Result::Ok($name {
                    $(
                        $field: container.decode_field(
                            &$crate::FieldKey::new($crate::codable!(@key $field $($key)?)),
                        )?,
                    )*
                })
            }
        }
    };
}
