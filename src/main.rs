use std::{process, sync::Arc};

use newsdesk::{
    application::{
        editorial::{audit::AuditService, posts::EditorialPostService},
        error::AppError,
        feed::PostFeedService,
        repos::{AuditRepo, PostsRepo, PostsWriteRepo},
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{EditorialState, HttpState, build_editorial_router, build_router},
        telemetry,
    },
};
use tokio::try_join;
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

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let repositories = init_repositories(&settings).await?;

    let posts_reader: Arc<dyn PostsRepo> = repositories.clone();
    let posts_writer: Arc<dyn PostsWriteRepo> = repositories.clone();
    let audit_repo: Arc<dyn AuditRepo> = repositories.clone();

    let page_size = u64::from(settings.site.page_size.get());
    let feed = PostFeedService::new(posts_reader.clone(), page_size);
    let audit = AuditService::new(audit_repo);
    let editorial_posts = EditorialPostService::new(posts_reader, posts_writer, audit.clone());

    let public_router = build_router(HttpState {
        feed: feed.clone(),
        db: repositories.clone(),
        site: settings.site.clone(),
    });

    let editorial_router = build_editorial_router(EditorialState {
        posts: editorial_posts,
        feed,
        audit,
        db: repositories,
        site: settings.site.clone(),
    });

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let editorial_listener = tokio::net::TcpListener::bind(settings.server.editorial_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        public_addr = %settings.server.public_addr,
        editorial_addr = %settings.server.editorial_addr,
        "listening",
    );

    let public_server = axum::serve(public_listener, public_router.into_make_service());
    let editorial_server = axum::serve(editorial_listener, editorial_router.into_make_service());

    try_join!(public_server, editorial_server)
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}
