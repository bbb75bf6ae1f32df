//! Common ID Types
//!
//! Type-safe ID wrappers for domain entities.

use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Generic typed ID wrapper
///
/// The marker parameter keeps a post id from being passed where a user id
/// is expected.
///
/// ```
/// use kernel::id::{Id, markers};
/// type UserId = Id<markers::User>;
/// let id: UserId = Id::new();
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: uuid::Uuid,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    /// Create a new random ID (UUID v4)
    pub fn new() -> Self {
        Self {
            value: Uuid::new_v4(),
            _marker: PhantomData,
        }
    }

    /// Create from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            value: uuid,
            _marker: PhantomData,
        }
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.value
    }

    /// Convert to UUID
    pub fn into_uuid(self) -> Uuid {
        self.value
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<Uuid> for Id<T> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<T> From<Id<T>> for Uuid {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

impl<T> serde::Serialize for Id<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> serde::Deserialize<'de> for Id<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}

impl<T> std::str::FromStr for Id<T> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self::from_uuid)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct User;
    /// Server-side record behind a refresh token
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AuthSession;
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TwoFactorDevice;
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Post;
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Comment;
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MediaAsset;
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Category;
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Tag;
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Reaction;
}

pub type UserId = Id<markers::User>;
pub type AuthSessionId = Id<markers::AuthSession>;
pub type DeviceId = Id<markers::TwoFactorDevice>;
pub type PostId = Id<markers::Post>;
pub type CommentId = Id<markers::Comment>;
pub type MediaAssetId = Id<markers::MediaAsset>;
pub type CategoryId = Id<markers::Category>;
pub type TagId = Id<markers::Tag>;
pub type ReactionId = Id<markers::Reaction>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_type_safety() {
        let user_id: UserId = Id::new();
        let post_id: PostId = Id::new();

        // Different marker types, cannot be mixed
        let _u: Uuid = user_id.into_uuid();
        let _p: Uuid = post_id.into_uuid();
    }

    #[test]
    fn test_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id: UserId = Id::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn test_id_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id: PostId = Id::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));

        let back: PostId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!("nope".parse::<PostId>().is_err());
    }
}
