use certwatch_domain::{Certification, CertificationState, Classification, ExpiryPolicy, Tenant};
use chrono::{DateTime, Utc};
use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use super::EmailMessage;

const HTML_TEMPLATE: &str = "reminder.html";
const TEXT_TEMPLATE: &str = "reminder.txt";
const DATE_FORMAT: &str = "%d %B %Y";

/// How pressing a reminder is, derived from the certification state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Expired,
    ExpiresSoon,
    RenewalDue,
    RenewalReminder,
}

impl Urgency {
    pub fn for_classification(classification: &Classification) -> Self {
        match (classification.state, classification.days_until_expiry) {
            (CertificationState::Expired, _) => Self::Expired,
            (CertificationState::Expiring, Some(days)) if days <= 30 => Self::ExpiresSoon,
            (CertificationState::Expiring, _) => Self::RenewalDue,
            (CertificationState::Active, _) => Self::RenewalReminder,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Expired => "EXPIRED",
            Self::ExpiresSoon => "EXPIRES SOON",
            Self::RenewalDue => "RENEWAL DUE",
            Self::RenewalReminder => "RENEWAL REMINDER",
        }
    }

    fn is_urgent(&self) -> bool {
        matches!(self, Self::Expired | Self::ExpiresSoon)
    }

    fn subject_template(&self) -> &'static str {
        match self {
            Self::Expired => "subject.expired",
            Self::ExpiresSoon => "subject.expires_soon",
            Self::RenewalDue => "subject.renewal_due",
            Self::RenewalReminder => "subject.renewal_reminder",
        }
    }
}

const SUBJECTS: [(&str, &str); 4] = [
    (
        "subject.expired",
        "URGENT: Your {{course_title}} certification has expired",
    ),
    (
        "subject.expires_soon",
        "URGENT: Your {{course_title}} certification expires in {{days_until_expiry}} days",
    ),
    (
        "subject.renewal_due",
        "Reminder: Your {{course_title}} certification expires in {{days_until_expiry}} days",
    ),
    (
        "subject.renewal_reminder",
        "Reminder: {{course_title}} certification renewal",
    ),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderEmail {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl ReminderEmail {
    pub fn to_message(&self, to: &str) -> EmailMessage {
        EmailMessage {
            to: to.to_string(),
            subject: self.subject.clone(),
            html_body: self.html_body.clone(),
            text_body: self.text_body.clone(),
        }
    }
}

#[derive(Serialize)]
struct ReminderTemplateData<'a> {
    subject: String,
    urgency: &'static str,
    urgent: bool,
    expired: bool,
    customer_name: &'a str,
    course_title: &'a str,
    category: &'a str,
    tenant_name: &'a str,
    certification_date: String,
    expiry_date: Option<String>,
    days_until_expiry: Option<i64>,
    certificate_number: Option<&'a str>,
}

/// Renders reminder emails from templates compiled into the binary.
///
/// The html body is rendered with html escaping, subject and plain text
/// body without it.
pub struct ReminderTemplates {
    html: Handlebars<'static>,
    plain: Handlebars<'static>,
}

impl ReminderTemplates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut html = Handlebars::new();
        html.register_template_string(
            HTML_TEMPLATE,
            include_str!("../../../templates/reminder.html.hbs"),
        )?;

        let mut plain = Handlebars::new();
        plain.register_escape_fn(handlebars::no_escape);
        plain.register_template_string(
            TEXT_TEMPLATE,
            include_str!("../../../templates/reminder.txt.hbs"),
        )?;
        for (name, template) in SUBJECTS {
            plain.register_template_string(name, template)?;
        }

        Ok(Self { html, plain })
    }

    pub fn render(
        &self,
        certification: &Certification,
        tenant: &Tenant,
        classification: &Classification,
        policy: &ExpiryPolicy,
    ) -> Result<ReminderEmail, RenderError> {
        let urgency = Urgency::for_classification(classification);
        let format_date =
            |date: DateTime<Utc>| date.with_timezone(&tenant.timezone).format(DATE_FORMAT).to_string();
        let achievement = &certification.achievement;

        let mut data = ReminderTemplateData {
            subject: String::new(),
            urgency: urgency.label(),
            urgent: urgency.is_urgent(),
            expired: classification.is_expired(),
            customer_name: &certification.customer.name,
            course_title: &certification.course.title,
            category: &certification.course.category,
            tenant_name: &tenant.name,
            certification_date: format_date(achievement.certification_date),
            expiry_date: achievement.effective_expiry(policy).map(format_date),
            days_until_expiry: classification.days_until_expiry,
            certificate_number: achievement.certificate_number.as_deref(),
        };

        let subject = self.plain.render(urgency.subject_template(), &data)?;
        data.subject = subject.clone();
        let html_body = self.html.render(HTML_TEMPLATE, &data)?;
        let text_body = self.plain.render(TEXT_TEMPLATE, &data)?;

        Ok(ReminderEmail {
            subject,
            html_body,
            text_body,
        })
    }
}
