use std::sync::Arc;

use crate::domain::new_prospect::NewProspect;
use crate::domain::prospect::Prospect;
use crate::mailing_list_client::{MailingList, MailingListError};
use crate::prospect_store::{ProspectStore, StoreError};

/// Registers prospects in the store and on the mailing list.
pub struct ProspectService {
    store: Arc<dyn ProspectStore>,
    mailing_list: Arc<dyn MailingList>,
    list_id: String,
}

#[derive(Debug)]
pub enum CreateProspectOutcome {
    Created(Prospect),
    /// A prospect with the same email was already registered. Nothing was written.
    Duplicate,
}

#[derive(Debug, thiserror::Error)]
pub enum ProspectServiceError {
    #[error("Failed to access the prospect store.")]
    Store(#[from] StoreError),
    #[error("Failed to subscribe {email} to the mailing list.")]
    MailingList {
        email: String,
        #[source]
        source: MailingListError,
    },
}

impl ProspectService {
    pub fn new(
        store: Arc<dyn ProspectStore>,
        mailing_list: Arc<dyn MailingList>,
        list_id: String,
    ) -> ProspectService {
        ProspectService {
            store,
            mailing_list,
            list_id,
        }
    }

    /// Stores the prospect then subscribes it to the mailing list.
    ///
    /// The two writes are not atomic. When the subscription fails the stored
    /// record is deleted again so that the request can be retried; if that
    /// delete fails too, the record stays without a matching list member.
    #[tracing::instrument(
        name = "Register a new prospect",
        skip(self, new_prospect),
        fields(prospect_email = %new_prospect.email)
    )]
    pub async fn create_prospect(
        &self,
        new_prospect: NewProspect,
    ) -> Result<CreateProspectOutcome, ProspectServiceError> {
        if self.store.find_by_email(&new_prospect.email).await?.is_some() {
            tracing::info!("Prospect is already registered");
            return Ok(CreateProspectOutcome::Duplicate);
        }

        let prospect = match self.store.save(&new_prospect).await {
            Ok(prospect) => prospect,
            // Lost the race against a concurrent registration of the same email.
            Err(StoreError::ConstraintViolation) => {
                tracing::info!("Prospect was registered concurrently");
                return Ok(CreateProspectOutcome::Duplicate);
            }
            Err(err) => return Err(err.into()),
        };

        if let Err(err) = self
            .mailing_list
            .subscribe(&self.list_id, &prospect.email, prospect.created_date)
            .await
        {
            tracing::error!("Failed to subscribe prospect {}: {:?}", prospect.id, err);
            self.remove_unsubscribed(&prospect).await;

            return Err(ProspectServiceError::MailingList {
                email: prospect.email.to_string(),
                source: err,
            });
        }

        Ok(CreateProspectOutcome::Created(prospect))
    }

    #[tracing::instrument(name = "Get a prospect", skip(self))]
    pub async fn find_prospect(&self, id: i64) -> Result<Option<Prospect>, ProspectServiceError> {
        Ok(self.store.find_by_id(id).await?)
    }

    async fn remove_unsubscribed(&self, prospect: &Prospect) {
        if let Err(err) = self.store.delete(prospect.id).await {
            tracing::error!(
                "Prospect {} is stored but not on the mailing list: {:?}",
                prospect.id,
                err
            );
        }
    }
}
