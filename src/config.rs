use once_cell::sync::Lazy;
use serde::Deserialize;

/// The static config instance.
#[allow(dead_code)]
pub static INSTANCE: Lazy<Config> = Lazy::new(|| {
    #[cfg(not(test))]
    {
        use std::{fs::File, io::Read};

        return toml::from_str(&{
            let mut string = String::new();
            File::open("./data/config.toml")
                .unwrap()
                .read_to_string(&mut string)
                .unwrap();
            string
        })
        .unwrap();
    }

    #[cfg(test)]
    Config::default()
});

/// Describing the server configuration.
#[derive(Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub mail_smtp: MailSmtp,
    #[serde(default)]
    pub moderation: Moderation,
    /// When set, an approved admin account with this address is seeded
    /// into an empty account store on startup.
    #[serde(default)]
    pub admin_email: Option<lettre::Address>,
}

/// Describing mailing configuration.
#[derive(Deserialize, Clone)]
pub struct MailSmtp {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub address: lettre::Address,
}

impl Default for MailSmtp {
    fn default() -> Self {
        Self {
            server: String::default(),
            port: 0,
            username: String::default(),
            password: String::default(),
            address: lettre::Address::new("user", "email.com").unwrap(),
        }
    }
}

/// Report-policy switches. The defaults match the observed behavior of
/// the legacy system: authors may report their own posts and repeated
/// reports keep counting.
#[derive(Deserialize, Clone, Copy)]
pub struct Moderation {
    pub allow_self_report: bool,
    pub count_repeat_reports: bool,
}

impl Default for Moderation {
    fn default() -> Self {
        Self {
            allow_self_report: true,
            count_repeat_reports: true,
        }
    }
}
