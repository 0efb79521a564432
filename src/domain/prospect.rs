use chrono::{DateTime, Utc};

use crate::domain::prospect_email::ProspectEmail;

/// A registered interest in the tournament, identified by its email.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Prospect {
    pub id: i64,
    pub email: ProspectEmail,
    #[serde(skip)]
    pub created_date: DateTime<Utc>,
}
