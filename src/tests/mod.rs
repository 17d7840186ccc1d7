mod account;
mod post;

use axum::body::Body;
use axum::http::Request;
use rand::Rng;

use sps_shared::account::AccountStatus;
use sps_shared::profile::{PrivacyMode, StudentProfile};

/// Clear every static store between tests.
pub fn reset_all() {
    crate::account::INSTANCE.reset();
    crate::profile::INSTANCE.reset();
    crate::post::INSTANCE.reset();
    crate::complaint::INSTANCE.reset();
    crate::moderation::INSTANCE.reset();
    crate::filter::INSTANCE.reset();
    crate::account::notify::OUTBOX.lock().clear();
}

/// Push a student account in the target status, returning its id.
pub fn push_student(email_user: &str, status: AccountStatus) -> u64 {
    let email = lettre::Address::new(email_user, "university.edu").unwrap();
    let mut account = crate::account::Account::new(
        email,
        "Test Student".to_string(),
        "29805150100000".to_string(),
        "uploads/document.pdf".to_string(),
    );
    match status {
        AccountStatus::Pending => (),
        AccountStatus::Approved => {
            account.approve().unwrap();
        }
        AccountStatus::Rejected => {
            account.reject().unwrap();
        }
        AccountStatus::Graduated => {
            account.approve().unwrap();
            account.mark_graduated().unwrap();
        }
    }
    let id = account.id();
    crate::account::INSTANCE.push(account);
    id
}

/// Push an approved admin account, returning its id.
pub fn push_admin(email_user: &str) -> u64 {
    let account = crate::account::Account::new_admin(
        lettre::Address::new(email_user, "university.edu").unwrap(),
        "Test Admin".to_string(),
    );
    let id = account.id();
    crate::account::INSTANCE.push(account);
    id
}

/// Push an empty public profile for the target account, returning its
/// id and slug.
pub fn push_profile(account: u64) -> (u64, String) {
    let profile = StudentProfile {
        id: rand::thread_rng().gen(),
        account,
        bio: None,
        address: None,
        department: None,
        skills: None,
        interests: None,
        projects: None,
        github: None,
        linkedin: None,
        contact_email: None,
        image: None,
        slug: crate::profile::generate_slug(),
        privacy: PrivacyMode::Public,
    };
    let result = (profile.id, profile.slug.clone());
    crate::profile::INSTANCE.push(profile);
    result
}

/// Build an authenticated json request.
pub fn json_request(uri: &str, account: u64, body: &impl serde::Serialize) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("AccountId", account.to_string())
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Build an unauthenticated json request.
pub fn anonymous_request(uri: &str, body: &impl serde::Serialize) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Build an authenticated bodyless request.
pub fn empty_request(uri: &str, account: u64) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("AccountId", account.to_string())
        .body(Body::empty())
        .unwrap()
}

/// Read a response body back as json.
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
