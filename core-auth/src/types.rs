use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";
const AVATAR_BACKGROUND: &str = "1DB954";

/// Profile of the signed-in user as handed over by the auth provider.
///
/// Known keys are typed; anything else the provider sends is kept verbatim
/// in `extra` so it survives a store round-trip.
///
/// ```
/// use core_auth::UserProfile;
///
/// let profile: UserProfile = serde_json::from_str(
///     r#"{"Id": 7, "firstName": "Ana", "lastName": "Lima", "plan": "free"}"#,
/// ).unwrap();
///
/// assert_eq!(profile.display_name(), "Ana Lima");
/// assert_eq!(profile.extra["plan"], "free");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "firstName", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "emailAddress", default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(rename = "profilePicture", default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// `"{first} {last}"`, with missing parts left empty.
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
    }

    /// Profile picture, or a generated initials avatar when none is set.
    pub fn avatar_url(&self) -> String {
        match self.profile_picture.as_deref() {
            Some(picture) if !picture.is_empty() => picture.to_string(),
            _ => initials_avatar_url(&self.display_name(), None),
        }
    }
}

/// Avatar service URL rendering `name` as initials on the brand colour.
pub fn initials_avatar_url(name: &str, size: Option<u32>) -> String {
    let mut url = format!(
        "{}?name={}&background={}&color=fff",
        AVATAR_SERVICE,
        encode_uri_component(name),
        AVATAR_BACKGROUND
    );
    if let Some(size) = size {
        url.push_str(&format!("&size={}", size));
    }
    url
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Partial profile merged over the current one by `UpdateProfile`.
///
/// Only `Some` fields and `extra` keys overwrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "firstName", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "emailAddress", default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(rename = "profilePicture", default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProfilePatch {
    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    pub fn email_address(mut self, value: impl Into<String>) -> Self {
        self.email_address = Some(value.into());
        self
    }

    pub fn profile_picture(mut self, value: impl Into<String>) -> Self {
        self.profile_picture = Some(value.into());
        self
    }

    /// Shallow merge onto `base`.
    pub fn apply_to(self, mut base: UserProfile) -> UserProfile {
        if self.id.is_some() {
            base.id = self.id;
        }
        if self.first_name.is_some() {
            base.first_name = self.first_name;
        }
        if self.last_name.is_some() {
            base.last_name = self.last_name;
        }
        if self.email_address.is_some() {
            base.email_address = self.email_address;
        }
        if self.profile_picture.is_some() {
            base.profile_picture = self.profile_picture;
        }
        base.extra.extend(self.extra);
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_keeps_unknown_keys() {
        let raw = json!({
            "Id": 3,
            "firstName": "Ana",
            "emailAddress": "ana@vibestream.io",
            "accounts": [{"companyId": 1}]
        });
        let profile: UserProfile = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(profile.id, Some(3));
        assert_eq!(profile.last_name, None);
        assert_eq!(serde_json::to_value(&profile).unwrap(), raw);
    }

    #[test]
    fn test_avatar_url_fallback() {
        let profile = UserProfile {
            first_name: Some("Ana".into()),
            last_name: Some("Lima".into()),
            ..Default::default()
        };
        assert_eq!(
            profile.avatar_url(),
            "https://ui-avatars.com/api/?name=Ana%20Lima&background=1DB954&color=fff"
        );

        let with_picture = UserProfile {
            profile_picture: Some("https://img.example.com/ana.png".into()),
            ..profile
        };
        assert_eq!(with_picture.avatar_url(), "https://img.example.com/ana.png");
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("Road Trip & Chill"), "Road%20Trip%20%26%20Chill");
        assert_eq!(encode_uri_component("it's (live)!"), "it's%20(live)!");
        assert_eq!(encode_uri_component("Café"), "Caf%C3%A9");
    }

    #[test]
    fn test_initials_avatar_with_size() {
        assert_eq!(
            initials_avatar_url("Mix", Some(400)),
            "https://ui-avatars.com/api/?name=Mix&background=1DB954&color=fff&size=400"
        );
    }

    #[test]
    fn test_patch_merges_shallowly() {
        let base = UserProfile {
            first_name: Some("A".into()),
            last_name: Some("B".into()),
            ..Default::default()
        };

        let merged = ProfilePatch::default().first_name("X").apply_to(base);

        assert_eq!(merged.first_name.as_deref(), Some("X"));
        assert_eq!(merged.last_name.as_deref(), Some("B"));
    }
}
