use job_tracker_backend::{
    build_router,
    config::{get_config, init_config},
    database::pool::create_pool,
    services::application_service::ApplicationService,
    AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn start_ghosting_job(
    service: ApplicationService,
    schedule: &str,
) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| anyhow::anyhow!("failed to create scheduler: {:?}", e))?;
    let job = Job::new_async(schedule, move |_id, _lock| {
        let service = service.clone();
        Box::pin(async move {
            if let Err(e) = service.sweep_ghosting_all().await {
                tracing::error!(error = ?e, "scheduled ghosting sweep failed");
            }
        })
    })
    .map_err(|e| anyhow::anyhow!("invalid GHOSTING_SWEEP_CRON {:?}: {:?}", schedule, e))?;
    scheduler
        .add(job)
        .await
        .map_err(|e| anyhow::anyhow!("failed to add ghosting job: {:?}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("failed to start scheduler: {:?}", e))?;
    Ok(scheduler)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    init_config()?;
    let config = get_config()?.clone();

    let pool = create_pool(&config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    tokio::fs::create_dir_all(&config.uploads_dir).await?;
    info!("Serving uploads from: {}", config.uploads_dir);

    let addr: SocketAddr = config.server_address.parse()?;
    let sweep_cron = config.ghosting_sweep_cron.clone();
    let app_state = AppState::new(pool, config);

    let _scheduler = match sweep_cron {
        Some(schedule) => {
            let scheduler =
                start_ghosting_job(app_state.application_service.clone(), &schedule).await?;
            info!(%schedule, "ghosting sweep scheduled");
            Some(scheduler)
        }
        None => None,
    };

    let app = build_router(app_state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
