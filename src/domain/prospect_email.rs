use validator::validate_email;

const MAX_CHAR_LENGTH: usize = 100;

/// Email of a prospect, trimmed and lowercased so uniqueness does not depend on casing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProspectEmail(String);

impl ProspectEmail {
    pub fn parse(email: String) -> Result<ProspectEmail, String> {
        let email = email.trim().to_lowercase();
        // Counted after lowercasing, which can lengthen the string, and in
        // chars to match the VARCHAR(100) column.
        let is_too_long = email.chars().count() > MAX_CHAR_LENGTH;

        if email.is_empty() || is_too_long || !validate_email(&email) {
            return Err(format!("{} email is not valid", email));
        }

        Ok(Self(email))
    }
}

impl AsRef<str> for ProspectEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProspectEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
