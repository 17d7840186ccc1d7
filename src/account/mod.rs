pub mod handle;
pub mod notify;

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use sps_shared::account::{AccountStatus, Role};

use crate::{resource::FileRef, Error};

/// The static instance of accounts.
pub static INSTANCE: Lazy<AccountManager> = Lazy::new(AccountManager::new);

/// A registered account.
///
/// A fresh registration always starts as [`AccountStatus::Pending`];
/// the status field is only ever moved through the transition methods,
/// which reject anything outside the review state machine.
#[derive(Serialize, Deserialize, Debug)]
pub struct Account {
    /// The only id of this account, derived from its email.
    id: u64,
    email: lettre::Address,
    full_name: String,
    national_id: String,
    /// Reference to the stored identity document.
    document: FileRef,
    status: AccountStatus,
    role: Role,
    registration_time: DateTime<Utc>,
}

impl Account {
    /// Creates a pending student account.
    pub fn new(
        email: lettre::Address,
        full_name: String,
        national_id: String,
        document: FileRef,
    ) -> Self {
        Self {
            id: email_hash(&email),
            email,
            full_name,
            national_id,
            document,
            status: AccountStatus::Pending,
            role: Role::Student,
            registration_time: Utc::now(),
        }
    }

    /// Creates an approved admin account, for seeding a fresh store.
    pub fn new_admin(email: lettre::Address, full_name: String) -> Self {
        Self {
            id: email_hash(&email),
            email,
            full_name,
            national_id: String::new(),
            document: FileRef::new(),
            status: AccountStatus::Approved,
            role: Role::Admin,
            registration_time: Utc::now(),
        }
    }

    /// Get the only id of this account.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn email(&self) -> &lettre::Address {
        &self.email
    }

    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[inline]
    pub fn document(&self) -> &FileRef {
        &self.document
    }

    #[inline]
    pub fn status(&self) -> AccountStatus {
        self.status
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    pub fn registration_time(&self) -> DateTime<Utc> {
        self.registration_time
    }

    /// Pending → Approved.
    ///
    /// Returns whether the status changed: re-approving an approved
    /// account is a no-op so the audit trail gains no duplicate entry.
    ///
    /// # Errors
    ///
    /// - Errors if the account is rejected or graduated.
    pub fn approve(&mut self) -> Result<bool, Error> {
        match self.status {
            AccountStatus::Pending => {
                self.status = AccountStatus::Approved;
                Ok(true)
            }
            AccountStatus::Approved => Ok(false),
            from => Err(Error::Transition {
                from: from.as_str(),
                to: AccountStatus::Approved.as_str(),
            }),
        }
    }

    /// Pending → Rejected. Same no-op rule as [`Self::approve`].
    pub fn reject(&mut self) -> Result<bool, Error> {
        match self.status {
            AccountStatus::Pending => {
                self.status = AccountStatus::Rejected;
                Ok(true)
            }
            AccountStatus::Rejected => Ok(false),
            from => Err(Error::Transition {
                from: from.as_str(),
                to: AccountStatus::Rejected.as_str(),
            }),
        }
    }

    /// Approved → Graduated. No other transition into or out of
    /// Graduated exists.
    pub fn mark_graduated(&mut self) -> Result<bool, Error> {
        match self.status {
            AccountStatus::Approved => {
                self.status = AccountStatus::Graduated;
                Ok(true)
            }
            AccountStatus::Graduated => Ok(false),
            from => Err(Error::Transition {
                from: from.as_str(),
                to: AccountStatus::Graduated.as_str(),
            }),
        }
    }

    /// Save this account and return whether it was saved successfully.
    #[must_use = "The save result should be handled"]
    pub fn save(&self) -> bool {
        #[cfg(not(test))]
        {
            use std::{fs::File, io::Write};

            match File::create(format!("./data/accounts/{}.toml", self.id)) {
                Ok(mut file) => file
                    .write_all(
                        match toml::to_string(self) {
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

    /// Remove this account's file and return whether it was removed
    /// successfully.
    #[must_use = "The deletion result should be handled"]
    pub fn remove(&self) -> bool {
        #[cfg(not(test))]
        {
            return std::fs::remove_file(format!("./data/accounts/{}.toml", self.id)).is_ok();
        }

        #[cfg(test)]
        true
    }
}

fn email_hash(email: &lettre::Address) -> u64 {
    let mut hasher = DefaultHasher::new();
    email.hash(&mut hasher);
    hasher.finish()
}

/// A simple account manager.
pub struct AccountManager {
    accounts: RwLock<Vec<RwLock<Account>>>,
    /// An index cache for getting index from an id.
    index: DashMap<u64, usize>,
}

impl AccountManager {
    /// Read and create an account manager from `./data/accounts`.
    fn new() -> Self {
        #[cfg(not(test))]
        {
            use std::{fs, io::Read};

            let _ = fs::create_dir_all("./data/accounts");
            let mut vec = Vec::new();
            let index = DashMap::new();
            let mut i = 0;
            for dir in fs::read_dir("./data/accounts").unwrap() {
                if let Ok(account) = dir.map(|e| {
                    toml::from_str::<Account>(&{
                        let mut string = String::new();
                        fs::File::open(e.path())
                            .unwrap()
                            .read_to_string(&mut string)
                            .unwrap();
                        string
                    })
                    .unwrap()
                }) {
                    index.insert(account.id(), i);
                    vec.push(RwLock::new(account));
                    i += 1;
                }
            }
            return Self {
                accounts: RwLock::new(vec),
                index,
            };
        }

        #[cfg(test)]
        Self {
            accounts: RwLock::new(Vec::new()),
            index: DashMap::new(),
        }
    }

    /// Get inner accounts.
    pub fn inner(&self) -> &RwLock<Vec<RwLock<Account>>> {
        &self.accounts
    }

    /// Get the inner index cache.
    pub fn index(&self) -> &DashMap<u64, usize> {
        &self.index
    }

    /// Push an account into this instance.
    pub fn push(&self, account: Account) {
        let mut accounts = self.accounts.write();
        self.index.insert(account.id(), accounts.len());
        accounts.push(RwLock::new(account));
    }

    /// Indicates whether the target id is contained in this instance.
    pub fn contains(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    /// Indicates whether an account with the target email exists.
    pub fn contains_email(&self, email: &lettre::Address) -> bool {
        self.accounts
            .read()
            .iter()
            .any(|account| account.read().email() == email)
    }

    /// Run `f` against the target account.
    pub fn with_account<R>(&self, id: u64, f: impl FnOnce(&Account) -> R) -> Result<R, Error> {
        let index = *self.index.get(&id).ok_or(Error::AccountNotFound(id))?;
        let accounts = self.accounts.read();
        let account = accounts
            .get(index)
            .ok_or(Error::AccountNotFound(id))?
            .read();
        Ok(f(&account))
    }

    /// Run `f` against the target account with write access. The account
    /// stays locked for the whole call, so a status change and whatever
    /// must pair with it commit together.
    pub fn with_account_mut<R>(
        &self,
        id: u64,
        f: impl FnOnce(&mut Account) -> R,
    ) -> Result<R, Error> {
        let index = *self.index.get(&id).ok_or(Error::AccountNotFound(id))?;
        let accounts = self.accounts.read();
        let mut account = accounts
            .get(index)
            .ok_or(Error::AccountNotFound(id))?
            .write();
        Ok(f(&mut account))
    }

    /// Role of the target account.
    pub fn role_of(&self, id: u64) -> Result<Role, Error> {
        self.with_account(id, |account| account.role())
    }

    /// Remove the target account.
    pub fn remove(&self, id: u64) {
        if let Some(index) = self.index.get(&id).map(|e| *e.value()) {
            {
                let accounts = self.accounts.read();
                if let Some(account) = accounts.get(index) {
                    if !account.read().remove() {
                        tracing::error!("failed to remove account file for {id}");
                    }
                }
            }
            self.accounts.write().remove(index);
            self.update_index();
        }
    }

    /// Update the index cache of this instance.
    fn update_index(&self) {
        self.index.clear();
        for (i, account) in self.accounts.read().iter().enumerate() {
            self.index.insert(account.read().id(), i);
        }
    }

    #[cfg(test)]
    pub fn reset(&self) {
        self.accounts.write().clear();
        self.index.clear();
    }
}
