use crate::cli::ServeArgs;
use crate::infra::{survey_source, AppState};
use crate::routes::with_survey_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use declic::config::AppConfig;
use declic::error::AppError;
use declic::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let source = Arc::new(survey_source(&config, args.data_dir.take()));
    if !source.root().is_dir() {
        warn!(dir = %source.root().display(), "survey data directory is missing");
    }
    if !config.mail.is_configured() {
        warn!("mail provider identifiers are not set; clients cannot send results by email");
    }

    let app = with_survey_routes(source.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_dir = %source.root().display(),
        "survey document service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
