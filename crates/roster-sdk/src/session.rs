use roster_types::fields::take_string;
use roster_types::{Entity, EntityMeta, FieldDef, Fields, ValidationError};
use serde_json::Value;

/// Persisted mapping from a session id to the user that owns it.
#[derive(Clone, Debug)]
pub struct UserSession {
    meta: EntityMeta,
    pub user_id: String,
    pub session_id: String,
}

static SESSION_FIELDS: [FieldDef<UserSession>; 2] = [
    FieldDef::new("user_id", |s: &UserSession| Value::String(s.user_id.clone())),
    FieldDef::new("session_id", |s: &UserSession| {
        Value::String(s.session_id.clone())
    }),
];

impl UserSession {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl PartialEq for UserSession {
    fn eq(&self, other: &Self) -> bool {
        self.meta.id == other.meta.id
    }
}

impl Eq for UserSession {}

impl Entity for UserSession {
    const TYPE_NAME: &'static str = "UserSession";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn fields() -> &'static [FieldDef<Self>] {
        &SESSION_FIELDS
    }

    fn from_parts(meta: EntityMeta, fields: &mut Fields) -> Result<Self, ValidationError> {
        Ok(Self {
            meta,
            user_id: take_string(fields, "user_id")?,
            session_id: take_string(fields, "session_id")?,
        })
    }
}
