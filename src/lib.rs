pub mod config;
pub mod domain;
pub mod mailing_list_client;
pub mod prospect_service;
pub mod prospect_store;
pub mod routes;
pub mod startup;
pub mod telemetry;
