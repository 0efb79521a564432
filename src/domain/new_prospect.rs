use serde::Deserialize;

use crate::domain::prospect_email::ProspectEmail;

#[derive(Debug)]
pub struct NewProspect {
    pub email: ProspectEmail,
}

/// Payload accepted by the create endpoint. Both fields are optional so that a
/// pre-set `id` or a missing `email` can be answered with a proper alert instead
/// of a generic deserialization failure. `id` accepts any JSON value: a client
/// sending `"1"` still pre-specifies an identity.
#[derive(Deserialize, Debug)]
pub struct NewProspectBody {
    pub id: Option<serde_json::Value>,
    pub email: Option<String>,
}

impl TryFrom<NewProspectBody> for NewProspect {
    type Error = String;

    fn try_from(body: NewProspectBody) -> Result<Self, Self::Error> {
        let email = body
            .email
            .ok_or_else(|| String::from("email is required"))?;
        let email = ProspectEmail::parse(email)?;

        Ok(NewProspect { email })
    }
}
