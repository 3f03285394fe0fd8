//! Fixed text spoken by, or sent on behalf of, the intake agent.
//!
//! The wording is observable behaviour of the voice agent; edit with care.

pub const INITIAL_GREETING: &str = "Hello! I'm here to assist you with your medical visit details. Let's get started. Can you first tell me your Name and Date of Birth?";

pub const INTAKE_PREAMBLE: &str = "You are an AI assistant tasked with collecting patient information for a medical visit.
You need to gather the following details from the caller:
- Patient's name and date of birth
- Insurance information including payer name and ID
- Referral information including the name of the referring physician
- Chief medical complaint or reason for the visit
- Other demographics like address
- Contact information (here you should ask for an email that we can send a confirmation email to)
- Available providers and times (provide fake data if needed)
Make sure to ask each question clearly and collect all required information. If a response is unclear or incomplete, ask follow-up questions to get the necessary details.
also make sure that when you are listing off doctors, you list off doctors by the name \"Doctor\" and not Dr. make sure you do this.
Make sure to double check when you are receiving contact information, repeat it back to them and make sure you are formatting it properly when you repeat it back
as if it were there email";

const EXTRACTION_HEADER: &str = "Extract the following information from the transcript:
1. Email address
2. Name
3. Appointment details or other relevant information

Transcript:
";

const EXTRACTION_FOOTER: &str = "

Provide the information in the format, you should have the info formatted and cleaned up nicely so it has the doctor appointment on one line and each important piece of info on the line after
do not include the users address only include the appointment schedule what it is.:
Email: <email>
Name: <name>
Info: <info>
";

/// Builds the single-turn instruction that asks the completion model for the
/// three labelled lines understood by the response parser.
pub fn extraction_prompt(transcript: &str) -> String {
    let mut prompt =
        String::with_capacity(EXTRACTION_HEADER.len() + transcript.len() + EXTRACTION_FOOTER.len());
    prompt.push_str(EXTRACTION_HEADER);
    prompt.push_str(transcript);
    prompt.push_str(EXTRACTION_FOOTER);
    prompt
}
