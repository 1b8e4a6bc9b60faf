use roster_store::{Filter, Store, StoreConfig};
use roster_types::Entity;
use tracing::info;

use crate::error::SdkResult;
use crate::password::PasswordHasher;
use crate::payload::{NewUser, UserUpdate};
use crate::session::UserSession;
use crate::user::User;

/// Application context owning one store per declared type.
///
/// Open it once at startup and pass it (or a lock around it) to whatever
/// serves requests. Separate `Roster`s over separate directories are fully
/// independent.
#[derive(Debug)]
pub struct Roster {
    config: StoreConfig,
    users: Store<User>,
    sessions: Store<UserSession>,
}

impl Roster {
    /// Load every declared type's snapshot from `config.data_dir`.
    pub fn open(config: StoreConfig) -> SdkResult<Self> {
        let users: Store<User> = Store::open(&config)?;
        let sessions: Store<UserSession> = Store::open(&config)?;
        info!(
            data_dir = %config.data_dir.display(),
            users = users.count(),
            sessions = sessions.count(),
            "roster opened"
        );
        Ok(Self {
            config,
            users,
            sessions,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn users(&self) -> &Store<User> {
        &self.users
    }

    pub fn users_mut(&mut self) -> &mut Store<User> {
        &mut self.users
    }

    pub fn sessions(&self) -> &Store<UserSession> {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut Store<UserSession> {
        &mut self.sessions
    }

    /// Users whose email equals `email`.
    pub fn users_by_email(&self, email: &str) -> Vec<&User> {
        self.users.search(&Filter::new().eq("email", email))
    }

    /// Create and persist a user from a validated creation payload.
    pub fn create_user(&mut self, new: NewUser, hasher: &dyn PasswordHasher) -> SdkResult<&User> {
        let mut user = User::new();
        user.email = Some(new.email);
        user.set_password(&new.password, hasher)?;
        user.first_name = new.first_name;
        user.last_name = new.last_name;
        Ok(self.users.save(user)?)
    }

    /// Apply the non-empty parts of `update` to user `id` and persist.
    ///
    /// Returns `Ok(None)` when no user has that id.
    pub fn update_user(&mut self, id: &str, update: UserUpdate) -> SdkResult<Option<&User>> {
        let Some(current) = self.users.get(id) else {
            return Ok(None);
        };
        let mut user = current.clone();
        if let Some(first_name) = update.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = update.last_name {
            user.last_name = Some(last_name);
        }
        Ok(Some(self.users.save(user)?))
    }

    /// Remove user `id` together with every session that belongs to it.
    pub fn remove_user(&mut self, id: &str) -> SdkResult<Option<User>> {
        let Some(user) = self.users.remove(id)? else {
            return Ok(None);
        };
        let owned: Vec<_> = self
            .sessions
            .search(&Filter::new().eq("user_id", user.id().as_str()))
            .into_iter()
            .map(|s| s.id().clone())
            .collect();
        for session_id in owned {
            self.sessions.remove(&session_id)?;
        }
        Ok(Some(user))
    }
}
