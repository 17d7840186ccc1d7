//! Best-effort approval notifications.
//!
//! A failed send is logged and never rolls back the decision it
//! follows.

#[cfg(not(test))]
use once_cell::sync::Lazy;

#[cfg(not(test))]
static SENDER_INSTANCE: Lazy<ApprovalSender> = Lazy::new(ApprovalSender::new);

/// Notifications captured instead of sent under test:
/// `(address, subject)` pairs.
#[cfg(test)]
pub static OUTBOX: parking_lot::Mutex<Vec<(String, String)>> =
    parking_lot::Mutex::new(Vec::new());

const APPROVAL_SUBJECT: &str = "Your Account Has Been Approved";

/// Queue an approval notification for `email`, detached from the
/// request that triggered it.
pub fn notify_approval(email: lettre::Address, full_name: String) {
    #[cfg(not(test))]
    {
        tokio::spawn(async move {
            if let Err(err) = SENDER_INSTANCE.send_approval(&email, &full_name).await {
                tracing::error!("failed to send approval notification to {email}: {err}");
            }
        });
    }

    #[cfg(test)]
    {
        let _ = full_name;
        OUTBOX
            .lock()
            .push((email.to_string(), APPROVAL_SUBJECT.to_string()));
    }
}

#[cfg(not(test))]
struct ApprovalSender {
    config: &'static crate::config::MailSmtp,
}

#[cfg(not(test))]
impl ApprovalSender {
    fn new() -> Self {
        Self {
            config: &crate::config::INSTANCE.mail_smtp,
        }
    }

    fn mailer(&self) -> lettre::AsyncSmtpTransport<lettre::Tokio1Executor> {
        lettre::AsyncSmtpTransport::<lettre::Tokio1Executor>::relay(&self.config.server)
            .unwrap()
            .port(self.config.port)
            .credentials(lettre::transport::smtp::authentication::Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build()
    }

    async fn send_approval(
        &self,
        to: &lettre::Address,
        full_name: &str,
    ) -> Result<(), crate::Error> {
        use lettre::{
            message::{header::ContentType, Mailbox},
            AsyncTransport, Message,
        };

        let body = format!(
            "<h2>Account Approved</h2>\
             <p>Hello <b>{full_name}</b>,</p>\
             <p>Your account has been approved successfully. \
             You can now log in and build your profile.</p>"
        );

        let mailer = self.mailer();
        mailer
            .send(
                Message::builder()
                    .from(Mailbox::new(
                        Some("Student Profile".to_string()),
                        self.config.address.clone(),
                    ))
                    .to(Mailbox::new(None, to.clone()))
                    .subject(APPROVAL_SUBJECT)
                    .header(ContentType::TEXT_HTML)
                    .body(body)?,
            )
            .await?;
        Ok(())
    }
}
