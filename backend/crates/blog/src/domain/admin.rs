//! Admin registry
//!
//! Every entity managed through `/admin` is listed here together with what
//! the admin surface can do with it. The capability table is an exhaustive
//! match, so a new entity cannot be added without declaring them.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminEntity {
    Post,
    Category,
    Tag,
    Comment,
    MediaAsset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdminCapabilities {
    pub list: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
    /// Bulk actions exposed under the entity
    pub actions: &'static [&'static str],
}

impl AdminEntity {
    pub const ALL: [AdminEntity; 5] = [
        AdminEntity::Post,
        AdminEntity::Category,
        AdminEntity::Tag,
        AdminEntity::Comment,
        AdminEntity::MediaAsset,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            AdminEntity::Post => "post",
            AdminEntity::Category => "category",
            AdminEntity::Tag => "tag",
            AdminEntity::Comment => "comment",
            AdminEntity::MediaAsset => "media_asset",
        }
    }

    pub const fn capabilities(&self) -> AdminCapabilities {
        match self {
            AdminEntity::Post => AdminCapabilities {
                list: true,
                create: true,
                update: true,
                delete: true,
                actions: &["publish", "draft", "archive"],
            },
            AdminEntity::Category | AdminEntity::Tag => AdminCapabilities {
                list: true,
                create: true,
                update: false,
                delete: true,
                actions: &[],
            },
            AdminEntity::Comment => AdminCapabilities {
                list: true,
                create: false,
                update: false,
                delete: true,
                actions: &["approve"],
            },
            AdminEntity::MediaAsset => AdminCapabilities {
                list: true,
                create: true,
                update: false,
                delete: true,
                actions: &[],
            },
        }
    }
}

/// Status change applied to a batch of posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostBulkAction {
    Publish,
    Draft,
    Archive,
}

impl PostBulkAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "publish" => Some(PostBulkAction::Publish),
            "draft" => Some(PostBulkAction::Draft),
            "archive" => Some(PostBulkAction::Archive),
            _ => None,
        }
    }

    pub const fn target_status(&self) -> crate::domain::value_objects::PostStatus {
        use crate::domain::value_objects::PostStatus;
        match self {
            PostBulkAction::Publish => PostStatus::Published,
            PostBulkAction::Draft => PostStatus::Draft,
            PostBulkAction::Archive => PostStatus::Archived,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_actions_are_registered() {
        let actions = AdminEntity::Post.capabilities().actions;
        for action in actions {
            assert!(PostBulkAction::parse(action).is_some(), "{action}");
        }
        assert!(PostBulkAction::parse("delete").is_none());
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = AdminEntity::ALL.iter().map(AdminEntity::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), AdminEntity::ALL.len());
    }
}
