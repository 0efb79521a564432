use actix_web::error::JsonPayloadError;
use actix_web::http::header::LOCATION;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};

use crate::domain::new_prospect::{NewProspect, NewProspectBody};
use crate::prospect_service::{CreateProspectOutcome, ProspectService, ProspectServiceError};
use crate::routes::headers::{entity_creation_alert, failure_alert};

const ENTITY_NAME: &str = "prospect";

/// Body of every error response of the prospect endpoints.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorPayload {
    entity_name: &'static str,
    error_key: &'static str,
    message: String,
}

#[tracing::instrument(
    name = "Creating a new prospect handler",
    skip(body, prospect_service),
    fields(
        prospect_email = tracing::field::Empty
    )
)]
pub async fn handle_create_prospect(
    body: web::Json<NewProspectBody>,
    prospect_service: web::Data<ProspectService>,
) -> Result<HttpResponse, CreateProspectError> {
    let body = body.into_inner();

    if body.id.is_some() {
        return Err(CreateProspectError::IdExists);
    }

    let new_prospect =
        NewProspect::try_from(body).map_err(CreateProspectError::ValidationError)?;

    tracing::Span::current().record(
        "prospect_email",
        &tracing::field::display(&new_prospect.email),
    );

    match prospect_service.create_prospect(new_prospect).await? {
        CreateProspectOutcome::Created(prospect) => {
            let id = prospect.id.to_string();
            let mut response = HttpResponse::Created();

            response.insert_header((LOCATION, format!("/api/prospects/{}", id)));

            Ok(entity_creation_alert(&mut response, ENTITY_NAME, &id).json(prospect))
        }
        CreateProspectOutcome::Duplicate => Err(CreateProspectError::EmailExists),
    }
}

/// Answers bodies that are not a JSON prospect with the same alert headers and
/// payload as the other validation failures.
pub fn handle_json_error(err: JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    tracing::warn!("Rejected prospect payload: {}", err);

    CreateProspectError::MalformedBody(err.to_string()).into()
}

#[tracing::instrument(name = "Getting a prospect handler", skip(prospect_service))]
pub async fn handle_get_prospect(
    id: web::Path<i64>,
    prospect_service: web::Data<ProspectService>,
) -> Result<HttpResponse, GetProspectError> {
    let id = id.into_inner();

    match prospect_service.find_prospect(id).await? {
        Some(prospect) => Ok(HttpResponse::Ok().json(prospect)),
        None => Err(GetProspectError::NotFound(id)),
    }
}

#[derive(thiserror::Error)]
pub enum CreateProspectError {
    #[error("A new prospect cannot already have an ID.")]
    IdExists,
    #[error("{0}")]
    ValidationError(String),
    #[error("Request body is not a valid prospect: {0}")]
    MalformedBody(String),
    #[error("A prospect with this email is already registered.")]
    EmailExists,
    #[error("Failed to store the new prospect.")]
    PersistenceError(#[source] ProspectServiceError),
    #[error("Failed to register the new prospect on the mailing list.")]
    MailingListError(#[source] ProspectServiceError),
}

impl CreateProspectError {
    fn error_key(&self) -> &'static str {
        match self {
            CreateProspectError::IdExists => "idexists",
            CreateProspectError::ValidationError(_) => "invalidemail",
            CreateProspectError::MalformedBody(_) => "malformedbody",
            CreateProspectError::EmailExists => "emailexists",
            CreateProspectError::PersistenceError(_) => "persistence",
            CreateProspectError::MailingListError(_) => "mailinglist",
        }
    }
}

impl From<ProspectServiceError> for CreateProspectError {
    fn from(err: ProspectServiceError) -> Self {
        match err {
            ProspectServiceError::Store(_) => CreateProspectError::PersistenceError(err),
            ProspectServiceError::MailingList { .. } => CreateProspectError::MailingListError(err),
        }
    }
}

impl std::fmt::Debug for CreateProspectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for CreateProspectError {
    fn status_code(&self) -> StatusCode {
        match self {
            CreateProspectError::IdExists
            | CreateProspectError::ValidationError(_)
            | CreateProspectError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            CreateProspectError::EmailExists => StatusCode::CONFLICT,
            CreateProspectError::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CreateProspectError::MailingListError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());

        failure_alert(&mut response, ENTITY_NAME, self.error_key()).json(ErrorPayload {
            entity_name: ENTITY_NAME,
            error_key: self.error_key(),
            message: self.to_string(),
        })
    }
}

#[derive(thiserror::Error)]
pub enum GetProspectError {
    #[error("Prospect {0} does not exist.")]
    NotFound(i64),
    #[error("Failed to get the prospect.")]
    PersistenceError(#[from] ProspectServiceError),
}

impl std::fmt::Debug for GetProspectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for GetProspectError {
    fn status_code(&self) -> StatusCode {
        match self {
            GetProspectError::NotFound(_) => StatusCode::NOT_FOUND,
            GetProspectError::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_key = match self {
            GetProspectError::NotFound(_) => "notfound",
            GetProspectError::PersistenceError(_) => "persistence",
        };
        let mut response = HttpResponse::build(self.status_code());

        failure_alert(&mut response, ENTITY_NAME, error_key).json(ErrorPayload {
            entity_name: ENTITY_NAME,
            error_key,
            message: self.to_string(),
        })
    }
}

fn error_chain_fmt(
    err: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}", err)?;

    let mut current = err.source();

    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }

    Ok(())
}
