mod email;

pub use email::{
    inmemory::InMemoryMailer,
    smtp::SmtpMailer,
    template::{ReminderEmail, ReminderTemplates, Urgency},
    EmailMessage, IMailer, MailerError,
};
