use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A stored user record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// The editable fields of a user, as sent in POST and PUT bodies.
///
/// Field names match case-insensitively (`"Name"` fills `name`). Missing or
/// `null` fields read as empty strings so the validator reports them as
/// required. An `id` or any other key in the body is ignored, and a repeated
/// key keeps its last value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into() }
    }
}

impl<'de> Deserialize<'de> for UserDraft {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DraftVisitor)
    }
}

struct DraftVisitor;

impl<'de> Visitor<'de> for DraftVisitor {
    type Value = UserDraft;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a user object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<UserDraft, A::Error> {
        let mut draft = UserDraft::default();
        while let Some(key) = map.next_key::<String>()? {
            let slot = if key.eq_ignore_ascii_case("name") {
                &mut draft.name
            } else if key.eq_ignore_ascii_case("email") {
                &mut draft.email
            } else {
                map.next_value::<IgnoredAny>()?;
                continue;
            };
            *slot = map.next_value::<Option<String>>()?.unwrap_or_default();
        }
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_tolerates_missing_null_and_extra_fields() {
        let draft: UserDraft = serde_json::from_str(r#"{"id":99,"name":null}"#).unwrap();
        assert_eq!(draft, UserDraft::default());
    }

    #[test]
    fn draft_keys_match_any_case() {
        let draft: UserDraft = serde_json::from_str(r#"{"NAME":"Dana","Email":"dana@x.com"}"#).unwrap();
        assert_eq!(draft, UserDraft::new("Dana", "dana@x.com"));
    }

    #[test]
    fn repeated_key_keeps_the_last_value() {
        let draft: UserDraft = serde_json::from_str(r#"{"name":"Dana","Name":"Erin"}"#).unwrap();
        assert_eq!(draft.name, "Erin");
    }

    #[test]
    fn draft_must_be_an_object_of_strings() {
        assert!(serde_json::from_str::<UserDraft>("[]").is_err());
        assert!(serde_json::from_str::<UserDraft>(r#"{"name":42}"#).is_err());
    }

    #[test]
    fn user_serializes_flat() {
        let user = User { id: 1, name: "Alice".into(), email: "alice@example.com".into() };
        assert_eq!(
            serde_json::to_string(&user).unwrap(),
            r#"{"id":1,"name":"Alice","email":"alice@example.com"}"#
        );
    }
}
