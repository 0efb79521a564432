//! Alert headers read by the front-end to display notifications after a request.

use actix_web::HttpResponseBuilder;

const APPLICATION_NAME: &str = "tournoiProspectsApp";

pub fn alert_header() -> String {
    format!("X-{}-alert", APPLICATION_NAME)
}

pub fn error_header() -> String {
    format!("X-{}-error", APPLICATION_NAME)
}

pub fn params_header() -> String {
    format!("X-{}-params", APPLICATION_NAME)
}

pub fn entity_creation_alert<'a>(
    builder: &'a mut HttpResponseBuilder,
    entity_name: &str,
    param: &str,
) -> &'a mut HttpResponseBuilder {
    builder
        .insert_header((
            alert_header(),
            format!("{}.{}.created", APPLICATION_NAME, entity_name),
        ))
        .insert_header((params_header(), param.to_string()))
}

pub fn failure_alert<'a>(
    builder: &'a mut HttpResponseBuilder,
    entity_name: &str,
    error_key: &str,
) -> &'a mut HttpResponseBuilder {
    builder
        .insert_header((error_header(), format!("error.{}", error_key)))
        .insert_header((params_header(), entity_name.to_string()))
}
