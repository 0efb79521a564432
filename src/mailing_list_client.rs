use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::domain::prospect_email::ProspectEmail;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);
const SUBSCRIBED_STATUS: &str = "subscribed";
// Title of the problem returned by the API when the address is already on the list.
const MEMBER_EXISTS_TITLE: &str = "Member Exists";

/// Remote mailing list on which new prospects are registered.
#[async_trait]
pub trait MailingList: Send + Sync {
    async fn subscribe(
        &self,
        list_id: &str,
        email: &ProspectEmail,
        signup_timestamp: DateTime<Utc>,
    ) -> Result<(), MailingListError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailingListError {
    #[error("Failed to reach the mailing list API.")]
    Transport(#[from] reqwest::Error),
    #[error("The mailing list API rejected the credentials.")]
    Unauthorized,
    #[error("The mailing list API rejected the member with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
}

pub struct MailingListClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

#[derive(serde::Serialize)]
struct CreateMemberBody<'a> {
    email_address: &'a str,
    status: &'a str,
    timestamp_signup: String,
}

#[derive(serde::Deserialize, Default)]
struct ProblemDetail {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

impl MailingListClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Option<time::Duration>,
    ) -> Result<MailingListClient, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()?;

        Ok(MailingListClient {
            http_client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl MailingList for MailingListClient {
    #[tracing::instrument(
        name = "Subscribe a prospect to the mailing list",
        skip(self, signup_timestamp),
        fields(prospect_email = %email)
    )]
    async fn subscribe(
        &self,
        list_id: &str,
        email: &ProspectEmail,
        signup_timestamp: DateTime<Utc>,
    ) -> Result<(), MailingListError> {
        let url = format!("{}/lists/{}/members", self.base_url, list_id);
        let body = CreateMemberBody {
            email_address: email.as_ref(),
            status: SUBSCRIBED_STATUS,
            timestamp_signup: signup_timestamp.to_rfc3339(),
        };

        // The API accepts any user name as long as the password is the API key.
        let response = self
            .http_client
            .post(&url)
            .basic_auth("tournoi", Some(self.api_key.expose_secret()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MailingListError::Unauthorized);
        }

        let problem: ProblemDetail = response.json().await.unwrap_or_default();

        if status == StatusCode::BAD_REQUEST && problem.title == MEMBER_EXISTS_TITLE {
            tracing::warn!("{} is already a member of list {}", email, list_id);
            return Ok(());
        }

        Err(MailingListError::Rejected {
            status: status.as_u16(),
            detail: problem.detail,
        })
    }
}
