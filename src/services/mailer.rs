//! Transactional email via Resend.
//!
//! Only account codes are mailed: email confirmation after signup and
//! password reset. When `RESEND_API_KEY` / `RESEND_FROM` are not set the
//! mailer is absent and callers log the code instead.

use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;

use super::account::CodePurpose;

const CONFIRMATION_TEMPLATE: &str = include_str!("../../templates/email_confirmation.html");
const PASSWORD_RESET_TEMPLATE: &str = include_str!("../../templates/password_reset.html");

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("invalid link base url: {0}")]
    Link(String),
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Clone)]
pub struct Mailer {
    api_key: String,
    from: String,
    public_base_url: String,
}

impl Mailer {
    /// Build a mailer when both Resend settings are present and non-blank.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, public_base_url: &str) -> Option<Self> {
        let api_key = lookup("RESEND_API_KEY").filter(|v| !v.trim().is_empty())?;
        let from = lookup("RESEND_FROM").filter(|v| !v.trim().is_empty())?;
        Some(Self { api_key, from, public_base_url: public_base_url.to_owned() })
    }

    /// Send an account code to `to_email`.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError`] if the link cannot be built or Resend rejects
    /// the message.
    pub async fn send_code(&self, to_email: &str, purpose: CodePurpose, code: &str) -> Result<(), MailerError> {
        let link = action_link(&self.public_base_url, purpose, to_email, code)?;
        let html = render_template(purpose, to_email, code, &link);

        let resend = Resend::new(&self.api_key);
        let to = [to_email];
        let email = CreateEmailBaseOptions::new(&self.from, to, subject(purpose)).with_html(&html);
        resend
            .emails
            .send(email)
            .await
            .map_err(|e| MailerError::Delivery(e.to_string()))?;
        Ok(())
    }
}

#[must_use]
pub fn subject(purpose: CodePurpose) -> &'static str {
    match purpose {
        CodePurpose::EmailConfirmation => "Confirm your ThyroidCloud account",
        CodePurpose::PasswordReset => "Your ThyroidCloud password reset code",
    }
}

/// Link back into the app with the email and code prefilled.
///
/// # Errors
///
/// Returns [`MailerError::Link`] if `base_url` is not an absolute URL.
pub fn action_link(base_url: &str, purpose: CodePurpose, email: &str, code: &str) -> Result<String, MailerError> {
    let path = match purpose {
        CodePurpose::EmailConfirmation => "confirm",
        CodePurpose::PasswordReset => "reset-password",
    };
    let url = reqwest::Url::parse_with_params(&format!("{base_url}/{path}"), &[("email", email), ("code", code)])
        .map_err(|e| MailerError::Link(e.to_string()))?;
    Ok(url.into())
}

#[must_use]
pub fn render_template(purpose: CodePurpose, email: &str, code: &str, link: &str) -> String {
    let template = match purpose {
        CodePurpose::EmailConfirmation => CONFIRMATION_TEMPLATE,
        CodePurpose::PasswordReset => PASSWORD_RESET_TEMPLATE,
    };
    template
        .replace("{{EMAIL}}", &escape_html(email))
        .replace("{{CODE}}", code)
        .replace("{{LINK}}", &escape_html(link))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "mailer_test.rs"]
mod tests;
