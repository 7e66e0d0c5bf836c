mod telemetry;

use certwatch_api::Application;
use certwatch_infra::{run_migration, setup_context};
use telemetry::{get_subscriber, init_subscriber};
use tracing::error;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("certwatch".into(), "info".into());
    init_subscriber(subscriber);

    if let Err(e) = run_migration().await {
        error!("Failed to run migrations: {:?}", e);
        return Err(std::io::Error::new(std::io::ErrorKind::Other, e));
    }

    let context = setup_context().await.map_err(|e| {
        error!("Failed to set up the context: {:?}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let app = Application::new(context).await?;
    app.start().await
}
