use std::{process, sync::Arc};

use lorekeeper::{
    application::{
        consumer::Consumer, dispatcher::Dispatcher, equipments::EquipmentTypeService,
        error::AppError, sources::SourceService,
    },
    cache::InMemoryCache,
    config,
    infra::{broker::ChannelBroker, catalogue::HttpCatalogueClient, db::PostgresLookups, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    let pool = PostgresLookups::connect(
        &settings.database.url,
        settings.database.max_connections.get(),
    )
    .await
    .map_err(|err| AppError::unexpected(format!("failed to connect to the database: {err}")))?;
    PostgresLookups::run_migrations(&pool)
        .await
        .map_err(|err| AppError::unexpected(format!("failed to run migrations: {err}")))?;
    let lookups = PostgresLookups::new(pool);

    let types = EquipmentTypeService::new(
        lookups
            .equipment_types()
            .await
            .map_err(|err| AppError::unexpected(err.to_string()))?,
        lookups
            .weapon_exceptions()
            .await
            .map_err(|err| AppError::unexpected(err.to_string()))?,
    );

    let catalogue = HttpCatalogueClient::new(&settings.source)
        .map_err(|err| AppError::unexpected(err.to_string()))?;
    let sources = Arc::new(SourceService::new(
        Arc::new(catalogue),
        Arc::new(InMemoryCache::new()),
        settings.source.timeout,
    ));
    let dispatcher = Arc::new(Dispatcher::new(sources, Arc::new(types)));

    let broker = Arc::new(ChannelBroker::new(
        settings.broker.capacity.get() as usize
    ));
    let consumer = Arc::new(Consumer::new(broker, dispatcher, &settings.broker));

    info!(version = env!("CARGO_PKG_VERSION"), "lorekeeper starting");
    tokio::select! {
        result = consumer.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, stopping");
            Ok(())
        }
    }
}
