use intake_core::domain::fields::ExtractedFields;

const EMAIL_LABEL: &str = "Email: ";
const NAME_LABEL: &str = "Name: ";
const INFO_LABEL: &str = "Info: ";

/// Reads the `Email: `, `Name: ` and `Info: ` lines out of a completion.
///
/// Labels are exact and case-sensitive; the first matching line wins and the
/// value is everything after the label, including any later `": "`.
pub fn parse_completion(text: &str) -> ExtractedFields {
    ExtractedFields {
        email: labelled_value(text, EMAIL_LABEL),
        name: labelled_value(text, NAME_LABEL),
        info: labelled_value(text, INFO_LABEL),
    }
}

fn labelled_value(text: &str, label: &str) -> Option<String> {
    text.lines().find_map(|line| line.strip_prefix(label)).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use intake_core::domain::fields::ExtractedFields;

    use super::parse_completion;

    #[test]
    fn returns_all_three_values_verbatim() {
        let fields = parse_completion(
            "Sure, here you go.\nEmail: jane@example.com\nName: Jane Doe\nInfo: Checkup with Doctor Smith on Monday\n",
        );

        assert_eq!(
            fields,
            ExtractedFields {
                email: Some("jane@example.com".to_owned()),
                name: Some("Jane Doe".to_owned()),
                info: Some("Checkup with Doctor Smith on Monday".to_owned()),
            }
        );
    }

    #[test]
    fn missing_label_leaves_only_that_field_absent() {
        let fields = parse_completion("Email: jane@example.com\nInfo: Checkup");

        assert_eq!(fields.email.as_deref(), Some("jane@example.com"));
        assert_eq!(fields.name, None);
        assert_eq!(fields.info.as_deref(), Some("Checkup"));
    }

    #[test]
    fn value_with_embedded_colon_space_is_kept_whole() {
        let fields = parse_completion("Info: Appointment: Monday 10:30 with Doctor Smith");
        assert_eq!(fields.info.as_deref(), Some("Appointment: Monday 10:30 with Doctor Smith"));
    }

    #[test]
    fn first_matching_line_wins() {
        let fields = parse_completion("Name: Jane Doe\nName: John Roe");
        assert_eq!(fields.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn labels_are_exact_and_case_sensitive() {
        let fields = parse_completion("email: jane@example.com\n  Name: Jane\nName:Jane");
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn whitespace_after_label_is_not_trimmed() {
        let fields = parse_completion("Name:  Jane Doe \r\nEmail: \r\n");
        assert_eq!(fields.name.as_deref(), Some(" Jane Doe "));
        assert_eq!(fields.email.as_deref(), Some(""));
    }
}
