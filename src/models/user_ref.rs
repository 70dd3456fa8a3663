use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A user reference that is either a bare id or an expanded profile.
///
/// Document stores hand back both shapes depending on whether the reference
/// was populated at query time; callers go through [`UserRef::id`] instead of
/// branching on the shape at every use site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Expanded(UserProfile),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::Expanded(profile) => &profile.id,
        }
    }

    pub fn is(&self, user_id: &str) -> bool {
        self.id() == user_id
    }
}

impl From<&str> for UserRef {
    fn from(id: &str) -> Self {
        UserRef::Id(id.to_string())
    }
}

impl From<String> for UserRef {
    fn from(id: String) -> Self {
        UserRef::Id(id)
    }
}
