use crate::cli::ServeArgs;
use crate::infra::{AppState, ConsoleMailer, InMemoryPartnerDirectory};
use crate::routes::with_portal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use estate_portal::config::PortalConfig;
use estate_portal::error::AppError;
use estate_portal::telemetry;
use estate_portal::workflows::onboarding::OnboardingService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = PortalConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = Arc::new(InMemoryPartnerDirectory::default());
    let mailer = Arc::new(ConsoleMailer::new(config.mail.from_address.clone()));
    let onboarding_service = Arc::new(OnboardingService::new(directory, mailer));

    let app = with_portal_routes(onboarding_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "channel-partner onboarding service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
