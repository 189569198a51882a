//! Resolves the user identifier that keys everything in storage, and derives the shareable link
//! built around it.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use tracing::debug;
use uuid::Uuid;

/// Query parameter carrying the identifier in a shareable link.
pub const USER_PARAM: &str = "user";

const USER_ID_LENGTH: usize = 9;

/// An addressable context that may already carry a user identifier. Mutations write a freshly
/// minted identifier back so later resolutions reuse it.
pub trait IdentityContext {
    fn get(&self) -> Result<Option<String>>;

    fn set(&mut self, user_id: &str) -> Result<()>;
}

/// Returns the context's identifier verbatim when present, otherwise mints one and persists it
/// back into the context.
pub fn resolve_user_id(context: &mut impl IdentityContext) -> Result<String> {
    if let Some(existing) = context.get()? {
        return Ok(existing);
    }
    let minted = generate_user_id();
    debug!("Minted new user id {minted}");
    context.set(&minted)?;
    Ok(minted)
}

/// Short shareable token. No cryptographic requirement, this length is plenty for a personal
/// tracker.
pub fn generate_user_id() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(USER_ID_LENGTH);
    token
}

/// Base address plus the `user` parameter. Another session opening this link loads the same
/// stored record, there is no owner/viewer distinction.
pub fn share_url(base: &str, user_id: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{USER_PARAM}={user_id}")
}

/// Identity context used by the cli: an explicit `--user` value layered over a `user` file in
/// the application directory. Explicit values are used verbatim and never persisted.
pub struct FileIdentityContext {
    explicit: Option<String>,
    user_file: PathBuf,
}

impl FileIdentityContext {
    pub fn new(data_dir: &Path, explicit: Option<String>) -> Self {
        Self {
            explicit,
            user_file: data_dir.join(USER_PARAM),
        }
    }
}

impl IdentityContext for FileIdentityContext {
    fn get(&self) -> Result<Option<String>> {
        if let Some(explicit) = &self.explicit {
            return Ok(Some(explicit.clone()));
        }
        match fs::read_to_string(&self.user_file) {
            Ok(raw) => {
                let trimmed = raw.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, user_id: &str) -> Result<()> {
        fs::write(&self.user_file, user_id)?;
        Ok(())
    }
}
