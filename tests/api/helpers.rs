use reqwest::Response;
use sqlx::{migrate, Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tournoi_prospects::{
    config::{get_configuration, DatabaseSettings, Settings},
    startup::{get_connection_db_pool, Application},
};

pub struct TestApp {
    pub config: Settings,
    pub address: String,
    pub db_pool: PgPool,
    pub mailing_list_server: MockServer,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        let mut config = get_configuration().expect("Missing configuration file.");
        let db_test_name = format!("db_{}", Uuid::new_v4().to_string().replace('-', "_"));
        let mailing_list_server = MockServer::start().await;

        // Port 0 makes the OS pick the first available port, so every test gets its own server
        config.set_app_port(0);
        config.set_mailing_list_base_url(mailing_list_server.uri());

        let db_pool = configure_db(&mut config.database, db_test_name).await;

        let application = Application::build(config.clone())
            .await
            .expect("Failed to build application.");

        let address = format!("http://127.0.0.1:{}", application.get_port());

        tokio::spawn(application.run_until_stop());

        TestApp {
            address,
            config,
            db_pool,
            mailing_list_server,
        }
    }

    pub async fn post_prospect(&self, body: serde_json::Value) -> Response {
        let client = reqwest::Client::new();
        let url = format!("{}/api/prospects", self.address);

        client
            .post(&url)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_prospect(&self, id: i64) -> Response {
        let client = reqwest::Client::new();
        let url = format!("{}/api/prospects/{}", self.address, id);

        client
            .get(&url)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Mounts a mock accepting `times` new members on the configured list.
    pub async fn mailing_list_accepts(&self, times: u64) {
        Mock::given(path(format!(
            "/lists/{}/members",
            self.config.get_mailing_list_id()
        )))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(times)
        .mount(&self.mailing_list_server)
        .await;
    }

    pub async fn stored_emails(&self) -> Vec<String> {
        sqlx::query_scalar("SELECT email FROM prospect ORDER BY id")
            .fetch_all(&self.db_pool)
            .await
            .expect("Query to fetch prospects failed.")
    }
}

async fn configure_db(db_config: &mut DatabaseSettings, db_test_name: String) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect_with(&db_config.get_db_options())
        .await
        .expect("Failed to connect to Postgres.");

    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, db_test_name))
        .await
        .expect("Failed to create database.");

    connection
        .close()
        .await
        .expect("Failed to close connection.");

    // Execute migrations
    db_config.set_name(db_test_name);

    let db_pool = get_connection_db_pool(db_config);

    migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations.");

    db_pool
}
