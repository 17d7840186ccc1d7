use axum::routing::{get, post};

use sps_backend::{account, complaint, config, filter, moderation, post as posting, profile};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    seed_admin();

    run().await.unwrap();
}

/// Seed the configured admin account on first run, so a fresh install
/// has someone who can review registrations.
fn seed_admin() {
    if let Some(email) = &config::INSTANCE.admin_email {
        if !account::INSTANCE.contains_email(email) {
            let admin = account::Account::new_admin(email.clone(), "Administrator".to_string());
            tracing::info!("seeding admin account {} (id {})", email, admin.id());
            if !admin.save() {
                tracing::error!("error while saving seeded admin account");
            }
            account::INSTANCE.push(admin);
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let app = axum::Router::new()
        // Account lifecycle
        .route("/api/account/register", post(account::handle::register_student))
        .route("/api/account/status", post(account::handle::account_status))
        .route("/api/account/approve", post(account::handle::approve_student))
        .route("/api/account/reject", post(account::handle::reject_student))
        .route("/api/account/graduate", post(account::handle::graduate_student))
        .route("/api/account/delete", post(account::handle::delete_student))
        // Student profiles
        .route("/api/profile/submit", post(profile::handle::submit_profile))
        .route("/api/profile/privacy", post(profile::handle::set_privacy))
        .route("/api/profile/mine", post(profile::handle::my_profile))
        .route("/api/profile/view/:slug", get(profile::handle::view_profile))
        // Posting
        .route("/api/post/create", post(posting::handle::create_post))
        .route("/api/post/edit", post(posting::handle::edit_post))
        .route("/api/post/delete", post(posting::handle::delete_post))
        .route("/api/post/report", post(posting::handle::report_post))
        .route("/api/post/approve", post(posting::handle::approve_post))
        .route("/api/post/reject", post(posting::handle::reject_post))
        .route("/api/post/feed", post(posting::handle::get_feed))
        .route("/api/post/mine", post(posting::handle::my_posts))
        // Complaints
        .route("/api/complaint/create", post(complaint::handle::create_complaint))
        .route("/api/complaint/mine", post(complaint::handle::my_complaints))
        .route("/api/complaint/queue", post(complaint::handle::pending_complaints))
        .route("/api/complaint/review", post(complaint::handle::review_complaint))
        // Moderation
        .route("/api/moderation/dashboard", post(moderation::handle::dashboard))
        .route("/api/moderation/counts", post(moderation::handle::moderation_counts))
        .route(
            "/api/moderation/review-requests",
            post(moderation::handle::review_requests),
        )
        .route("/api/moderation/queue", post(moderation::handle::moderation_queue))
        .route("/api/moderation/reported", post(moderation::handle::reported_posts))
        .route(
            "/api/moderation/active-students",
            post(moderation::handle::active_students),
        )
        .route(
            "/api/moderation/banned-words",
            post(filter::handle::list_banned_words),
        )
        .route(
            "/api/moderation/banned-words/add",
            post(filter::handle::add_banned_word),
        )
        .route(
            "/api/moderation/banned-words/remove",
            post(filter::handle::remove_banned_word),
        );

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], 8080));
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
