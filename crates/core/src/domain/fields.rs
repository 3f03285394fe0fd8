use serde::Serialize;

/// Fields pulled out of a call transcript. A field the model did not
/// return is `None`, never an empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedFields {
    pub email: Option<String>,
    pub name: Option<String>,
    pub info: Option<String>,
}

/// All three fields present; the only shape accepted for a confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfirmationFields {
    pub email: String,
    pub name: String,
    pub info: String,
}

impl ExtractedFields {
    pub fn complete(self) -> Option<ConfirmationFields> {
        match (self.email, self.name, self.info) {
            (Some(email), Some(name), Some(info)) => Some(ConfirmationFields { email, name, info }),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.email.is_none() {
            missing.push("email");
        }
        if self.name.is_none() {
            missing.push("name");
        }
        if self.info.is_none() {
            missing.push("info");
        }
        missing
    }
}
