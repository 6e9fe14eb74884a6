pub mod cdn;
pub mod mailer;
