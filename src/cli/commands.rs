use crate::admission::Gate;
use crate::cli::Commands;
use crate::config::Settings;
use crate::k8s::K8sClient;
use crate::metrics::GateMetrics;
use crate::removal::{CleanupOutcome, MemberOutcome, Orchestrator};
use crate::store::EtcdStore;
use crate::webhook::{create_webhook_router, run_webhook_server, WebhookState};
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn handle_command(
    command: Commands,
    settings: Settings,
    shutdown: CancellationToken,
) -> Result<()> {
    let settings = Arc::new(settings);
    match command {
        Commands::Serve => handle_serve(settings, shutdown).await,
        Commands::Remove { pod } => handle_remove(settings, &pod, shutdown).await,
    }
}

async fn orchestrator(settings: Arc<Settings>, shutdown: CancellationToken) -> Result<Orchestrator> {
    let pods = K8sClient::try_default().await?;
    Ok(Orchestrator::new(
        settings,
        Arc::new(pods),
        Arc::new(EtcdStore::new()),
        shutdown,
    ))
}

async fn handle_serve(settings: Arc<Settings>, shutdown: CancellationToken) -> Result<()> {
    info!(
        namespace = %settings.namespace,
        label = %settings.label_key,
        image = %settings.store_image_prefix,
        "Guarding store pods"
    );

    let orchestrator = orchestrator(settings.clone(), shutdown.clone()).await?;
    let gate = Gate::new(
        settings.reserved_group.clone(),
        Arc::new(orchestrator),
        GateMetrics::new()?,
    );
    let router = create_webhook_router(WebhookState::new(gate));

    run_webhook_server(
        &settings.listen_addr,
        Path::new(&settings.tls_cert),
        Path::new(&settings.tls_key),
        router,
        shutdown,
    )
    .await
}

async fn handle_remove(
    settings: Arc<Settings>,
    pod: &str,
    shutdown: CancellationToken,
) -> Result<()> {
    info!("Graceful removal requested for pod: {}", pod);

    let outcome = orchestrator(settings, shutdown)
        .await?
        .remove_gracefully(pod)
        .await?;

    match outcome.member {
        MemberOutcome::Removed { id } => println!("Removed member {:x} ({})", id, outcome.pod),
        MemberOutcome::NotAMember => println!("{} is not a store member; nothing removed", outcome.pod),
    }
    match &outcome.cleanup {
        CleanupOutcome::Deleted => println!("Deleted pod {}", outcome.pod),
        CleanupOutcome::Failed(e) => println!("Warning: {}", e),
        CleanupOutcome::NotAttempted => {}
    }
    Ok(())
}
