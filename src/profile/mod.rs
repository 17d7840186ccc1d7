pub mod handle;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rand::Rng;

use sps_shared::profile::StudentProfile;

/// The static instance of student profiles.
pub static INSTANCE: Lazy<ProfileManager> = Lazy::new(ProfileManager::new);

/// Upper bound on the free-text projects section.
pub const MAX_PROJECTS_LEN: usize = 1024;

#[must_use = "The save result should be handled"]
pub fn save_profile(_profile: &StudentProfile) -> bool {
    #[cfg(not(test))]
    {
        use std::{fs::File, io::Write};

        match File::create(format!("./data/profiles/{}.toml", _profile.id)) {
            Ok(mut file) => file
                .write_all(
                    match toml::to_string(_profile) {
                        Ok(s) => s,
                        Err(_) => return false,
                    }
                    .as_bytes(),
                )
                .is_ok(),
            Err(_) => false,
        }
    }

    #[cfg(test)]
    true
}

#[must_use = "The deletion result should be handled"]
pub fn remove_profile(_profile: &StudentProfile) -> bool {
    #[cfg(not(test))]
    {
        return std::fs::remove_file(format!("./data/profiles/{}.toml", _profile.id)).is_ok();
    }

    #[cfg(test)]
    true
}

/// A simple profile manager.
///
/// At most one profile exists per account; the index cache keys on the
/// owning account id.
pub struct ProfileManager {
    pub profiles: RwLock<Vec<RwLock<StudentProfile>>>,
    /// An index cache for getting index from an owning account id.
    index: DashMap<u64, usize>,
}

impl ProfileManager {
    /// Read and create a profile manager from `./data/profiles`.
    fn new() -> Self {
        #[cfg(not(test))]
        {
            use std::{fs, io::Read};

            let _ = fs::create_dir_all("./data/profiles");
            let mut vec = Vec::new();
            let index = DashMap::new();
            let mut i = 0;
            for dir in fs::read_dir("./data/profiles").unwrap() {
                if let Ok(profile) = dir.map(|e| {
                    toml::from_str::<StudentProfile>(&{
                        let mut string = String::new();
                        fs::File::open(e.path())
                            .unwrap()
                            .read_to_string(&mut string)
                            .unwrap();
                        string
                    })
                    .unwrap()
                }) {
                    index.insert(profile.account, i);
                    vec.push(RwLock::new(profile));
                    i += 1;
                }
            }
            return Self {
                profiles: RwLock::new(vec),
                index,
            };
        }

        #[cfg(test)]
        Self {
            profiles: RwLock::new(Vec::new()),
            index: DashMap::new(),
        }
    }

    /// Push a profile into this instance.
    pub fn push(&self, profile: StudentProfile) {
        let mut profiles = self.profiles.write();
        self.index.insert(profile.account, profiles.len());
        profiles.push(RwLock::new(profile));
    }

    /// Profile id owned by the target account, if one exists.
    pub fn profile_id_of(&self, account: u64) -> Option<u64> {
        let index = *self.index.get(&account)?;
        let profiles = self.profiles.read();
        profiles.get(index).map(|profile| profile.read().id)
    }

    /// Indicates whether the target slug is already taken.
    pub fn contains_slug(&self, slug: &str) -> bool {
        self.profiles
            .read()
            .iter()
            .any(|profile| profile.read().slug == slug)
    }

    /// Snapshot of the profile behind the target slug.
    pub fn by_slug(&self, slug: &str) -> Option<StudentProfile> {
        self.profiles
            .read()
            .iter()
            .map(|profile| profile.read())
            .find(|profile| profile.slug == slug)
            .map(|profile| profile.clone())
    }

    /// Run `f` against the profile owned by the target account.
    pub fn with_profile_mut<R>(
        &self,
        account: u64,
        f: impl FnOnce(&mut StudentProfile) -> R,
    ) -> Option<R> {
        let index = *self.index.get(&account)?;
        let profiles = self.profiles.read();
        let mut profile = profiles.get(index)?.write();
        Some(f(&mut profile))
    }

    /// Remove the profile owned by the target account, returning it.
    pub fn remove_by_account(&self, account: u64) -> Option<StudentProfile> {
        let index = self.index.get(&account).map(|e| *e.value())?;
        let removed = {
            let mut profiles = self.profiles.write();
            if index >= profiles.len() {
                return None;
            }
            profiles.remove(index).into_inner()
        };
        if !remove_profile(&removed) {
            tracing::error!("failed to remove profile file for {}", removed.id);
        }
        self.update_index();
        Some(removed)
    }

    /// Update the index cache of this instance.
    fn update_index(&self) {
        self.index.clear();
        for (i, profile) in self.profiles.read().iter().enumerate() {
            self.index.insert(profile.read().account, i);
        }
    }

    #[cfg(test)]
    pub fn reset(&self) {
        self.profiles.write().clear();
        self.index.clear();
    }
}

/// Generate a fresh, collision-free profile slug.
///
/// The slug is the public lookup key, opaque and immutable once
/// assigned.
pub fn generate_slug() -> String {
    loop {
        let slug = format!("{:032x}", rand::thread_rng().gen::<u128>());
        if !INSTANCE.contains_slug(&slug) {
            return slug;
        }
    }
}
