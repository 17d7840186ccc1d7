pub mod handle;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use sps_shared::complaint::handle::ReviewComplaintVariant;
use sps_shared::complaint::{Complaint, ComplaintStatus};

use crate::Error;

/// The static instance of complaints.
pub static INSTANCE: Lazy<ComplaintManager> = Lazy::new(ComplaintManager::new);

#[must_use = "The save result should be handled"]
pub fn save_complaint(_complaint: &Complaint) -> bool {
    #[cfg(not(test))]
    {
        use std::{fs::File, io::Write};

        match File::create(format!("./data/complaints/{}.toml", _complaint.id)) {
            Ok(mut file) => file
                .write_all(
                    match toml::to_string(_complaint) {
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

/// Apply an admin review to a complaint, exhaustively over the triage
/// machine: Pending → Assigned | Resolved | Contacted, Assigned →
/// Resolved. Re-applying the current status is a no-op.
///
/// Returns whether the status changed.
pub fn apply_review(
    complaint: &mut Complaint,
    variant: &ReviewComplaintVariant,
) -> Result<bool, Error> {
    let (to, comment) = match variant {
        ReviewComplaintVariant::AssignToTechnical => (ComplaintStatus::Assigned, None),
        ReviewComplaintVariant::MarkResolved => (ComplaintStatus::Resolved, None),
        ReviewComplaintVariant::ContactSender(comment) => {
            (ComplaintStatus::Contacted, Some(comment.clone()))
        }
    };

    if complaint.status == to {
        return Ok(false);
    }

    let allowed = matches!(
        (complaint.status, to),
        (ComplaintStatus::Pending, ComplaintStatus::Assigned)
            | (ComplaintStatus::Pending, ComplaintStatus::Resolved)
            | (ComplaintStatus::Pending, ComplaintStatus::Contacted)
            | (ComplaintStatus::Assigned, ComplaintStatus::Resolved)
    );
    if !allowed {
        return Err(Error::Transition {
            from: complaint.status.as_str(),
            to: to.as_str(),
        });
    }

    complaint.status = to;
    if let Some(comment) = comment {
        complaint.admin_comment = Some(comment);
    }
    Ok(true)
}

/// A simple complaint manager.
pub struct ComplaintManager {
    pub complaints: RwLock<Vec<RwLock<Complaint>>>,
}

impl ComplaintManager {
    /// Read and create a complaint manager from `./data/complaints`.
    fn new() -> Self {
        #[cfg(not(test))]
        {
            use std::{fs, io::Read};

            let _ = fs::create_dir_all("./data/complaints");
            let mut vec = Vec::new();
            for dir in fs::read_dir("./data/complaints").unwrap() {
                if let Ok(complaint) = dir.map(|e| {
                    toml::from_str::<Complaint>(&{
                        let mut string = String::new();
                        fs::File::open(e.path())
                            .unwrap()
                            .read_to_string(&mut string)
                            .unwrap();
                        string
                    })
                    .unwrap()
                }) {
                    vec.push(RwLock::new(complaint));
                }
            }
            return Self {
                complaints: RwLock::new(vec),
            };
        }

        #[cfg(test)]
        Self {
            complaints: RwLock::new(Vec::new()),
        }
    }

    /// Push a complaint into this instance.
    pub fn push(&self, complaint: Complaint) {
        self.complaints.write().push(RwLock::new(complaint))
    }

    /// Indicates if the target id is already contained in this instance.
    pub fn contains_id(&self, id: u64) -> bool {
        self.complaints
            .read()
            .iter()
            .any(|complaint| complaint.read().id == id)
    }

    /// Run `f` against the target complaint with write access.
    pub fn with_complaint_mut<R>(
        &self,
        id: u64,
        f: impl FnOnce(&mut Complaint) -> R,
    ) -> Result<R, Error> {
        let complaints = self.complaints.read();
        for complaint in complaints.iter() {
            if complaint.read().id == id {
                let mut complaint = complaint.write();
                return Ok(f(&mut complaint));
            }
        }
        Err(Error::ComplaintNotFound(id))
    }

    #[cfg(test)]
    pub fn reset(&self) {
        self.complaints.write().clear();
    }
}

/// Generate a complaint id not yet contained in the manager.
pub fn new_complaint_id() -> u64 {
    use rand::Rng;

    loop {
        let id = rand::thread_rng().gen();
        if !INSTANCE.contains_id(id) {
            return id;
        }
    }
}
