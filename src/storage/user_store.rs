use std::{
    collections::BTreeMap,
    fs::File,
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs4::fs_std::FileExt;
use tracing::{debug, warn};

use crate::tracker::entities::UserData;

/// Name of the single blob file holding every user's data.
pub const STORAGE_FILE: &str = "users.json";

/// Interface for abstracting storage of user data. The whole dataset for a user is read and
/// written as one unit, there are no partial updates.
pub trait UserStore {
    /// Returns the stored data for `user_id`, or an empty dataset when none exists yet.
    fn load(&self, user_id: &str) -> Result<UserData>;

    /// Replaces the stored record for `data.user_id` with `data`.
    fn save(&self, data: &UserData) -> Result<()>;
}

impl<T: Deref> UserStore for T
where
    T::Target: UserStore,
{
    fn load(&self, user_id: &str) -> Result<UserData> {
        self.deref().load(user_id)
    }

    fn save(&self, data: &UserData) -> Result<()> {
        self.deref().save(data)
    }
}

/// The main realization of [UserStore]. Keeps one json file mapping user id to [UserData],
/// guarded by file locks so that a save never interleaves with another process's read.
pub struct JsonUserStore {
    blob_path: PathBuf,
}

impl JsonUserStore {
    pub fn new(data_dir: &Path) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(data_dir)?;

        Ok(Self {
            blob_path: data_dir.join(STORAGE_FILE),
        })
    }

    fn read_all(&self) -> Result<BTreeMap<String, UserData>> {
        debug!("Reading {:?}", self.blob_path);
        let mut file = match File::open(&self.blob_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let mut raw = String::new();
        let read_result = file.read_to_string(&mut raw);
        file.unlock()?;
        read_result?;

        Ok(parse_blob(&self.blob_path, &raw))
    }

    fn save_with_file(file: &mut File, path: &Path, data: &UserData) -> Result<()> {
        let mut raw = String::new();
        file.read_to_string(&mut raw)?;
        let mut all = parse_blob(path, &raw);
        all.insert(data.user_id.clone(), data.clone());

        file.seek(SeekFrom::Start(0))?;
        file.set_len(0)?;
        serde_json::to_writer(&mut *file, &all)?;
        file.flush()?;
        Ok(())
    }
}

/// A blob that fails to parse degrades to an empty dataset instead of failing every command.
fn parse_blob(path: &Path, raw: &str) -> BTreeMap<String, UserData> {
    if raw.trim().is_empty() {
        return BTreeMap::new();
    }
    match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Stored data in {path:?} is not valid json, starting over: {e}");
            BTreeMap::new()
        }
    }
}

impl UserStore for JsonUserStore {
    fn load(&self, user_id: &str) -> Result<UserData> {
        let all = self.read_all()?;
        Ok(all
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserData::new(user_id)))
    }

    fn save(&self, data: &UserData) -> Result<()> {
        let mut file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.blob_path)?;

        // Semi-safe acquire-release for the file
        file.lock_exclusive()?;
        let result = Self::save_with_file(&mut file, &self.blob_path, data);
        file.unlock()?;
        result
    }
}
