use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::mailing_list_client::MailingListClient;
use crate::prospect_service::ProspectService;
use crate::prospect_store::PgProspectStore;
use crate::routes::{
    handle_create_prospect, handle_get_prospect, handle_json_error, health_check,
};

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let db_pool = get_connection_db_pool(&config.database);
        let mailing_list_client = MailingListClient::new(
            config.get_mailing_list_base_url(),
            config.get_mailing_list_api_key(),
            Some(config.mailing_list.get_timeout()),
        )
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        let prospect_service = ProspectService::new(
            Arc::new(PgProspectStore::new(db_pool)),
            Arc::new(mailing_list_client),
            config.get_mailing_list_id(),
        );

        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let server = run(listener, prospect_service)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    prospect_service: ProspectService,
) -> Result<Server, std::io::Error> {
    let prospect_service = web::Data::new(prospect_service);

    let server = HttpServer::new(move || {
        App::new()
            // Logs every incoming request inside its own span
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/prospects", web::post().to(handle_create_prospect))
                    .route("/prospects/{id}", web::get().to(handle_get_prospect)),
            )
            .app_data(prospect_service.clone())
            .app_data(web::JsonConfig::default().error_handler(handle_json_error))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}
