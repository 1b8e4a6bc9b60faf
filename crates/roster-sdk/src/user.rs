use roster_types::fields::{opt_string, take_opt_string};
use roster_types::{Entity, EntityMeta, FieldDef, Fields, ValidationError};

use crate::password::{HashError, PasswordHasher};

/// A user account.
///
/// The password is only ever held as the token produced by a
/// [`PasswordHasher`], stored under the private `_password` field.
#[derive(Clone, Debug, Default)]
pub struct User {
    meta: EntityMeta,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

static USER_FIELDS: [FieldDef<User>; 4] = [
    FieldDef::new("email", |u: &User| opt_string(&u.email)),
    FieldDef::new("_password", |u: &User| opt_string(&u.password)),
    FieldDef::new("first_name", |u: &User| opt_string(&u.first_name)),
    FieldDef::new("last_name", |u: &User| opt_string(&u.last_name)),
];

impl User {
    /// A new, unsaved user with a fresh id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored password token with a hash of `plaintext`.
    pub fn set_password(&mut self, plaintext: &str, hasher: &dyn PasswordHasher) -> Result<(), HashError> {
        self.password = Some(hasher.hash(plaintext)?);
        Ok(())
    }

    /// Returns `true` if `plaintext` matches the stored token.
    pub fn is_valid_password(&self, plaintext: &str, hasher: &dyn PasswordHasher) -> bool {
        match &self.password {
            Some(token) => hasher.verify(token, plaintext),
            None => false,
        }
    }

    /// Human-readable name: full name when known, else the email.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone().unwrap_or_default(),
        }
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.meta.id == other.meta.id
    }
}

impl Eq for User {}

impl Entity for User {
    const TYPE_NAME: &'static str = "User";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn fields() -> &'static [FieldDef<Self>] {
        &USER_FIELDS
    }

    fn from_parts(meta: EntityMeta, fields: &mut Fields) -> Result<Self, ValidationError> {
        Ok(Self {
            meta,
            email: take_opt_string(fields, "email")?,
            password: take_opt_string(fields, "_password")?,
            first_name: take_opt_string(fields, "first_name")?,
            last_name: take_opt_string(fields, "last_name")?,
        })
    }
}
