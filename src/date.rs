//! Dates inside serde types.
//!
//! A serde type reaches the tree through its own `Serialize` impl, so a plain
//! `DateTime<Utc>` field keeps chrono's RFC 3339 form whatever
//! [`DateStrategy`](crate::DateStrategy) is set. Marking the field with
//! `#[serde(with = "serde_codable::date")]` hands it to the date strategy like
//! every other date leaf. Other serde formats still see an RFC 3339 string.
//!
//! Optional dates use `serde_codable::date::option` together with
//! `#[serde(default)]`.
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use serde::{Deserialize, Serialize};
//! use serde_codable::{from_str_with_context, to_string_with_context, Context, DateStrategy, Serde};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Delivery {
//!     #[serde(with = "serde_codable::date")]
//!     at: DateTime<Utc>,
//! }
//!
//! let context = Context::new().with_date_strategy(DateStrategy::SecondsSince1970);
//! let delivery = Delivery { at: DateTime::from_timestamp(1_522_324_117, 0).unwrap() };
//!
//! let json = to_string_with_context(&Serde(delivery), &context).unwrap();
//! assert_eq!(json, r#"{"at":1522324117.0}"#);
//!
//! let Serde(back) = from_str_with_context::<Serde<Delivery>>(&json, &context).unwrap();
//! assert_eq!(back.at.timestamp(), 1_522_324_117);
//! ```

use chrono::{DateTime, Utc};
use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::Serializer;
use std::fmt;

/// Newtype name the bridge recognizes as a date leaf.
pub(crate) const TOKEN: &str = "$serde_codable::private::Date";

pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_newtype_struct(TOKEN, date)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_newtype_struct(TOKEN, DateVisitor)
}

struct DateVisitor;

impl<'de> Visitor<'de> for DateVisitor {
    type Value = DateTime<Utc>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a date")
    }

    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        DateTime::<Utc>::deserialize(deserializer)
    }

    fn visit_str<E>(self, text: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        text.parse().map_err(E::custom)
    }
}

/// The same routing for `Option<DateTime<Utc>>` fields.
pub mod option {
    use super::{DateVisitor, TOKEN};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    struct Borrowed<'a>(&'a DateTime<Utc>);

    impl Serialize for Borrowed<'_> {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            super::serialize(self.0, serializer)
        }
    }

    struct Owned(DateTime<Utc>);

    impl<'de> Deserialize<'de> for Owned {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_newtype_struct(TOKEN, DateVisitor).map(Owned)
        }
    }

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_some(&Borrowed(date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Owned>::deserialize(deserializer).map(|date| date.map(|Owned(date)| date))
    }
}

#[cfg(test)]
mod tests {
    use crate::{from_value_with_context, to_value_with_context, value, Context, DateStrategy, Serde};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Harvest {
        #[serde(with = "crate::date")]
        picked: DateTime<Utc>,
        #[serde(with = "crate::date::option", default)]
        shipped: Option<DateTime<Utc>>,
        logged: DateTime<Utc>,
    }

    fn harvest() -> Harvest {
        let picked = DateTime::from_timestamp(1_522_324_117, 0).unwrap();
        Harvest { picked, shipped: Some(picked), logged: picked }
    }

    #[test]
    fn test_marked_dates_follow_strategy() {
        let context = Context::new().with_date_strategy(DateStrategy::formatted("%b-%d-%Y"));
        let tree = to_value_with_context(&Serde(harvest()), &context).unwrap();
        assert_eq!(
            tree,
            value!({ "picked": "Mar-29-2018", "shipped": "Mar-29-2018", "logged": "2018-03-29T11:48:37Z" })
        );

        let Serde(back) = from_value_with_context::<Serde<Harvest>>(&tree, &context).unwrap();
        assert_eq!(back, harvest().with_midnight());
    }

    #[test]
    fn test_marked_dates_round_trip_as_seconds() {
        let context = Context::new().with_date_strategy(DateStrategy::SecondsSince1970);
        let tree = to_value_with_context(&Serde(harvest()), &context).unwrap();
        assert_eq!(tree.get("picked"), Some(&value!(1_522_324_117.0)));

        let Serde(back) = from_value_with_context::<Serde<Harvest>>(&tree, &context).unwrap();
        assert_eq!(back, harvest());
    }

    #[test]
    fn test_missing_optional_date() {
        let tree = value!({ "picked": 0.0, "logged": "2018-03-29T11:48:37Z" });
        let context = Context::new().with_date_strategy(DateStrategy::SecondsSince1970);
        let Serde(back) = from_value_with_context::<Serde<Harvest>>(&tree, &context).unwrap();
        assert_eq!(back.shipped, None);
        assert_eq!(back.picked.timestamp(), 0);
    }

    #[test]
    fn test_plain_serde_formats_see_rfc3339() {
        let json = serde_json::to_string(&harvest()).unwrap();
        assert!(json.starts_with(r#"{"picked":"2018-03-29T11:48:37Z""#));
        let back: Harvest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, harvest());
    }

    impl Harvest {
        fn with_midnight(self) -> Self {
            let midnight = DateTime::from_timestamp(1_522_281_600, 0).unwrap();
            Harvest { picked: midnight, shipped: Some(midnight), ..self }
        }
    }
}
