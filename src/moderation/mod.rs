pub mod handle;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rand::Rng;

use sps_shared::account::{AccountStatus, Role};
use sps_shared::complaint::ComplaintStatus;
use sps_shared::moderation::{ActionLabel, AdminAction, ModerationCounts};
use sps_shared::post::PostStatus;

/// The static instance of the audit log.
pub static INSTANCE: Lazy<AuditLog> = Lazy::new(AuditLog::new);

/// The entity an admin decision was taken on.
///
/// Student decisions carry the profile id when one exists; an account
/// reviewed before building a profile leaves the reference empty.
#[derive(Debug, Clone, Copy)]
pub enum DecisionRef {
    Student(Option<u64>),
    Post(u64),
    Complaint(u64),
}

#[must_use = "The save result should be handled"]
fn save_action(_action: &AdminAction) -> bool {
    #[cfg(not(test))]
    {
        use std::{fs::File, io::Write};

        match File::create(format!("./data/actions/{}.toml", _action.id)) {
            Ok(mut file) => file
                .write_all(
                    match toml::to_string(_action) {
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

/// The append-only audit trail of admin decisions.
///
/// Every admin transition goes through [`Self::record`]; no call site
/// writes its own record, so no transition path can skip the trail.
pub struct AuditLog {
    pub actions: RwLock<Vec<AdminAction>>,
}

impl AuditLog {
    /// Read and create an audit log from `./data/actions`.
    fn new() -> Self {
        #[cfg(not(test))]
        {
            use std::{fs, io::Read};

            let _ = fs::create_dir_all("./data/actions");
            let mut vec = Vec::new();
            for dir in fs::read_dir("./data/actions").unwrap() {
                if let Ok(action) = dir.map(|e| {
                    toml::from_str::<AdminAction>(&{
                        let mut string = String::new();
                        fs::File::open(e.path())
                            .unwrap()
                            .read_to_string(&mut string)
                            .unwrap();
                        string
                    })
                    .unwrap()
                }) {
                    vec.push(action);
                }
            }
            return Self {
                actions: RwLock::new(vec),
            };
        }

        #[cfg(test)]
        Self {
            actions: RwLock::new(Vec::new()),
        }
    }

    /// Record an admin decision and return the record id.
    pub fn record(&self, target: DecisionRef, admin: u64, action: ActionLabel) -> u64 {
        let mut actions = self.actions.write();
        let action = AdminAction {
            id: {
                let mut id = rand::thread_rng().gen();
                while actions.iter().any(|a| a.id == id) {
                    id = rand::thread_rng().gen();
                }
                id
            },
            student_profile: match target {
                DecisionRef::Student(profile) => profile,
                _ => None,
            },
            post: match target {
                DecisionRef::Post(post) => Some(post),
                _ => None,
            },
            complaint: match target {
                DecisionRef::Complaint(complaint) => Some(complaint),
                _ => None,
            },
            admin,
            action,
            time: chrono::Utc::now(),
        };
        if !save_action(&action) {
            tracing::error!("error while saving admin action {}", action.id);
        }
        let id = action.id;
        actions.push(action);
        id
    }

    /// Clear references to a removed profile. The records stay.
    pub fn clear_profile_refs(&self, profile: u64) {
        for action in self.actions.write().iter_mut() {
            if action.student_profile == Some(profile) {
                action.student_profile = None;
                if !save_action(action) {
                    tracing::error!("error while saving admin action {}", action.id);
                }
            }
        }
    }

    /// Clear references to a removed post. The records stay.
    pub fn clear_post_refs(&self, post: u64) {
        for action in self.actions.write().iter_mut() {
            if action.post == Some(post) {
                action.post = None;
                if !save_action(action) {
                    tracing::error!("error while saving admin action {}", action.id);
                }
            }
        }
    }

    #[cfg(test)]
    pub fn reset(&self) {
        self.actions.write().clear();
    }
}

/// Recompute the moderation counts from the live stores. Nothing is
/// cached between queries.
pub fn counts() -> ModerationCounts {
    let (approved_students, pending_registrations) = {
        let accounts = crate::account::INSTANCE.inner().read();
        let mut approved = 0;
        let mut pending = 0;
        for account in accounts.iter() {
            let account = account.read();
            match account.status() {
                AccountStatus::Approved if account.role() == Role::Student => approved += 1,
                AccountStatus::Pending => pending += 1,
                _ => (),
            }
        }
        (approved, pending)
    };

    let (pending_posts, reported_posts) = {
        let posts = crate::post::INSTANCE.posts.read();
        let mut pending = 0;
        let mut reported = 0;
        for post in posts.iter() {
            let post = post.read();
            if post.status == PostStatus::Pending {
                pending += 1;
            }
            if post.is_reported {
                reported += 1;
            }
        }
        (pending, reported)
    };

    let pending_complaints = crate::complaint::INSTANCE
        .complaints
        .read()
        .iter()
        .filter(|complaint| complaint.read().status == ComplaintStatus::Pending)
        .count();

    ModerationCounts {
        approved_students,
        pending_registrations,
        pending_posts,
        reported_posts,
        pending_complaints,
    }
}
