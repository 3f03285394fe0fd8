use intake_core::domain::fields::ConfirmationFields;
use serde::Serialize;

/// Request body for the notification send endpoint:
/// `{"message":{"to":{"email":..},"content":{"title":..,"body":..}}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfirmationNotice {
    message: NoticeMessage,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NoticeMessage {
    pub to: Recipient,
    pub content: NoticeContent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NoticeContent {
    pub title: String,
    pub body: String,
}

impl ConfirmationNotice {
    pub fn new(email: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            message: NoticeMessage {
                to: Recipient { email: email.into() },
                content: NoticeContent { title: title.into(), body: body.into() },
            },
        }
    }

    pub fn for_fields(fields: &ConfirmationFields) -> Self {
        Self::new(
            fields.email.clone(),
            format!("Appointment confirmation for {}", fields.name),
            format!(
                "Hey {}, here is information about the appointment you just booked: {}",
                fields.name, fields.info
            ),
        )
    }

    pub fn recipient(&self) -> &str {
        &self.message.to.email
    }

    pub fn title(&self) -> &str {
        &self.message.content.title
    }

    pub fn body(&self) -> &str {
        &self.message.content.body
    }
}
