// SPDX-License-Identifier: MIT

//! Binary entry point for the `ClusterExtension` operator.
//!
//! Wires up logging, the Kubernetes client, reflector stores, the metrics
//! server, optional leader election, and the three controllers
//! (`ClusterExtension`, `ClusterExtensionRevision`, the catalog-cache
//! reconciler), then runs them until a shutdown signal arrives or
//! leadership is lost.

use anyhow::Result;
use axum::{routing::get, Router};
use clusterextension_operator::catalog_cache::CatalogCache;
use clusterextension_operator::context::{Context, ScopedClientCache, Stores};
use clusterextension_operator::crd::{Catalog, ClusterExtension, ClusterExtensionRevision};
use clusterextension_operator::defaults::{
    LoggingContentManager, SecretReleaseStore, ServiceAccountTokenMinter, UnimplementedImagePuller, UnimplementedResolver,
};
use clusterextension_operator::metrics::{self, Metrics};
use clusterextension_operator::settings::Settings;
use clusterextension_operator::{catalog_cache_controller, ce_controller, cer_controller, constants};
use futures::StreamExt;
use kube::runtime::controller::Action;
use kube::runtime::reflector::{reflector, store, ObjectRef};
use kube::runtime::{watcher, watcher::Config, Controller};
use kube::{Api, Client, ResourceExt};
use kube_lease_manager::{LeaseManager, LeaseManagerBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(constants::TOKIO_WORKER_THREADS)
        .thread_name("clusterextension-operator")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Initializes `tracing`, switching between compact and JSON output via
/// `RUST_LOG_FORMAT` (`"json"` or anything else for compact).
fn initialize_logging() {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let format = std::env::var("RUST_LOG_FORMAT").unwrap_or_default();
    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_target(false)
            .compact()
            .init();
    }
}

/// Builds the Kubernetes client plus the anonymous base config scoped
/// clients are minted from (§5: the base config carries no credentials of
/// its own; a per-identity token is injected at mint time).
async fn initialize_services() -> Result<(Client, kube::Config)> {
    let config = kube::Config::infer().await?;
    // kube-rs 3.0 applies rate limiting via Tower middleware rather than
    // direct QPS/burst fields on Config; Settings::kube_qps/kube_burst are
    // read but not yet wired through a custom Service stack.
    let client = Client::try_from(config.clone())?;

    let mut base_config = config;
    base_config.auth_info = Default::default();

    Ok((client, base_config))
}

async fn initialize_shared_context(client: Client, base_config: kube::Config, settings: Arc<Settings>) -> Result<Arc<Context>> {
    let cluster_extensions_api: Api<ClusterExtension> = Api::all(client.clone());
    let cluster_extension_revisions_api: Api<ClusterExtensionRevision> = Api::all(client.clone());
    let catalogs_api: Api<Catalog> = Api::all(client.clone());

    let (cluster_extensions_store, cluster_extensions_writer) = store();
    let (cluster_extension_revisions_store, cluster_extension_revisions_writer) = store();
    let (catalogs_store, catalogs_writer) = store();

    tokio::spawn(async move {
        let stream = watcher(cluster_extensions_api, Config::default());
        reflector(cluster_extensions_writer, stream).for_each(|_| futures::future::ready(())).await;
        warn!("ClusterExtension reflector stream ended");
    });

    tokio::spawn(async move {
        let stream = watcher(cluster_extension_revisions_api, Config::default());
        reflector(cluster_extension_revisions_writer, stream).for_each(|_| futures::future::ready(())).await;
        warn!("ClusterExtensionRevision reflector stream ended");
    });

    tokio::spawn(async move {
        let stream = watcher(catalogs_api, Config::default());
        reflector(catalogs_writer, stream).for_each(|_| futures::future::ready(())).await;
        warn!("Catalog reflector stream ended");
    });

    let stores = Stores {
        cluster_extensions: cluster_extensions_store,
        cluster_extension_revisions: cluster_extension_revisions_store,
        catalogs: catalogs_store,
    };

    let operator_namespace = std::env::var("POD_NAMESPACE").unwrap_or_else(|_| "olm-system".to_string());

    let catalog_cache = Arc::new(CatalogCache::new(settings.catalog_cache_dir.clone()));

    let context = Arc::new(Context {
        client: client.clone(),
        base_config,
        stores,
        metrics: Metrics::new(),
        settings,
        resolver: Arc::new(UnimplementedResolver),
        puller: Arc::new(UnimplementedImagePuller),
        token_minter: Arc::new(ServiceAccountTokenMinter::new(client.clone(), 3600)),
        release_store: Arc::new(SecretReleaseStore::new(client.clone(), operator_namespace)),
        content_manager: Arc::new(LoggingContentManager),
        scoped_clients: ScopedClientCache::new(),
        catalog_cache,
    });

    info!("Shared context initialized with reflectors for ClusterExtension, ClusterExtensionRevision, Catalog");

    Ok(context)
}

/// Starts the Prometheus metrics HTTP server on `bind_address`.
fn start_metrics_server(bind_address: String) -> tokio::task::JoinHandle<()> {
    info!(%bind_address, path = constants::METRICS_SERVER_PATH, "Starting metrics server");

    tokio::spawn(async move {
        let app = Router::new().route(constants::METRICS_SERVER_PATH, get(metrics_handler));

        let listener = match tokio::net::TcpListener::bind(&bind_address).await {
            Ok(listener) => listener,
            Err(err) => {
                error!(error = %err, "Failed to bind metrics server");
                return;
            }
        };

        if let Err(err) = axum::serve(listener, app).await {
            error!(error = %err, "Metrics server exited with error");
        }
    })
}

async fn metrics_handler() -> String {
    metrics::render().unwrap_or_else(|err| format!("# error rendering metrics: {err}"))
}

struct LeaderElectionConfig {
    enabled: bool,
    lease_name: String,
    lease_namespace: String,
    identity: String,
    lease_duration: u64,
    #[allow(dead_code)]
    renew_deadline: u64,
    retry_period: u64,
}

fn load_leader_election_config() -> LeaderElectionConfig {
    let lease_namespace = std::env::var("CLUSTEREXTENSION_LEASE_NAMESPACE")
        .or_else(|_| std::env::var("POD_NAMESPACE"))
        .unwrap_or_else(|_| "olm-system".to_string());

    let identity = std::env::var("POD_NAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| format!("clusterextension-operator-{}", rand::random::<u32>()));

    LeaderElectionConfig {
        enabled: std::env::var("CLUSTEREXTENSION_ENABLE_LEADER_ELECTION").map(|v| v != "false").unwrap_or(true),
        lease_name: std::env::var("CLUSTEREXTENSION_LEASE_NAME").unwrap_or_else(|_| "clusterextension-operator-leader".to_string()),
        lease_namespace,
        identity,
        lease_duration: env_u64("CLUSTEREXTENSION_LEASE_DURATION_SECONDS", constants::DEFAULT_LEASE_DURATION_SECS),
        renew_deadline: env_u64("CLUSTEREXTENSION_LEASE_RENEW_DEADLINE_SECONDS", constants::DEFAULT_LEASE_RENEW_DEADLINE_SECS),
        retry_period: env_u64("CLUSTEREXTENSION_LEASE_RETRY_PERIOD_SECONDS", constants::DEFAULT_LEASE_RETRY_PERIOD_SECS),
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn default_watcher_config() -> Config {
    Config::default()
}

fn semantic_watcher_config() -> Config {
    Config::default().any_semantic()
}

async fn run_clusterextension_operator(context: Arc<Context>) -> Result<()> {
    info!("Starting ClusterExtension operator");

    let client = context.client.clone();
    let api = Api::<ClusterExtension>::all(client.clone());
    let revision_api = Api::<ClusterExtensionRevision>::all(client.clone());
    let catalogs_api = Api::<Catalog>::all(client.clone());

    let ctx_for_catalog_watch = context.clone();

    Controller::new(api, default_watcher_config())
        .owns(revision_api, semantic_watcher_config())
        .watches(catalogs_api, default_watcher_config(), move |_catalog: Catalog| {
            // Any catalog event may newly satisfy or invalidate a blocked
            // resolution, so every ClusterExtension is requeued.
            ctx_for_catalog_watch.stores.cluster_extensions.state().iter().map(|ce| ObjectRef::new(&ce.name_any())).collect::<Vec<_>>()
        })
        .run(reconcile_clusterextension_wrapper, error_policy, context)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

async fn reconcile_clusterextension_wrapper(ce: Arc<ClusterExtension>, ctx: Arc<Context>) -> Result<Action, ReconcileError> {
    let start = std::time::Instant::now();
    debug!(name = %ce.name_any(), "Reconcile wrapper called for ClusterExtension");

    let result = Box::pin(ce_controller::reconcile(ce.clone(), ctx.clone())).await;
    let duration = start.elapsed();

    match result {
        Ok(action) => {
            ctx.metrics.record_reconciliation("clusterextension", "success", duration);
            Ok(action)
        }
        Err(err) => {
            error!(name = %ce.name_any(), error = %err, "Failed to reconcile ClusterExtension");
            ctx.metrics.record_reconciliation("clusterextension", "error", duration);
            Err(err.into())
        }
    }
}

async fn run_clusterextensionrevision_operator(context: Arc<Context>) -> Result<()> {
    info!("Starting ClusterExtensionRevision operator");

    let client = context.client.clone();
    let api = Api::<ClusterExtensionRevision>::all(client.clone());

    Controller::new(api, default_watcher_config())
        .run(reconcile_clusterextensionrevision_wrapper, error_policy, context)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

async fn reconcile_clusterextensionrevision_wrapper(
    cer: Arc<ClusterExtensionRevision>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = std::time::Instant::now();
    debug!(name = %cer.name_any(), "Reconcile wrapper called for ClusterExtensionRevision");

    let result = Box::pin(cer_controller::reconcile(cer.clone(), ctx.clone())).await;
    let duration = start.elapsed();

    match result {
        Ok(action) => {
            ctx.metrics.record_reconciliation("clusterextensionrevision", "success", duration);
            Ok(action)
        }
        Err(err) => {
            error!(name = %cer.name_any(), error = %err, "Failed to reconcile ClusterExtensionRevision");
            ctx.metrics.record_reconciliation("clusterextensionrevision", "error", duration);
            Err(err.into())
        }
    }
}

async fn run_catalog_cache_operator(context: Arc<Context>) -> Result<()> {
    info!("Starting catalog-cache operator");

    let client = context.client.clone();
    let api = Api::<Catalog>::all(client.clone());

    Controller::new(api, default_watcher_config())
        .run(reconcile_catalog_cache_wrapper, error_policy, context)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

async fn reconcile_catalog_cache_wrapper(catalog: Arc<Catalog>, ctx: Arc<Context>) -> Result<Action, ReconcileError> {
    let start = std::time::Instant::now();
    debug!(name = %catalog.name_any(), "Reconcile wrapper called for Catalog cache");

    let result = Box::pin(catalog_cache_controller::reconcile(catalog.clone(), ctx.clone())).await;
    let duration = start.elapsed();

    match result {
        Ok(action) => {
            ctx.metrics.record_reconciliation("catalog_cache", "success", duration);
            Ok(action)
        }
        Err(err) => {
            error!(name = %catalog.name_any(), error = %err, "Failed to reconcile Catalog cache entry");
            ctx.metrics.record_reconciliation("catalog_cache", "error", duration);
            Err(err.into())
        }
    }
}

/// Reconciles every existing `ClusterExtension`/`ClusterExtensionRevision`
/// once at startup, so drift that accumulated while the operator was down
/// (or during a leadership handoff) doesn't wait for the next watch event.
async fn perform_startup_drift_detection(client: Client, context: Arc<Context>) -> Result<()> {
    info!("Starting drift detection for ClusterExtension resources...");
    let ce_api: Api<ClusterExtension> = Api::all(client.clone());
    match ce_api.list(&kube::api::ListParams::default()).await {
        Ok(list) => {
            info!("Found {} ClusterExtension resources", list.items.len());
            for ce in list.items {
                let name = ce.name_any();
                match ce_controller::reconcile(Arc::new(ce), context.clone()).await {
                    Ok(_) => debug!("ClusterExtension {} reconciled successfully", name),
                    Err(err) => warn!("Failed to reconcile ClusterExtension {}: {}", name, err),
                }
            }
        }
        Err(err) => warn!("Failed to list ClusterExtension resources: {}", err),
    }

    info!("Starting drift detection for ClusterExtensionRevision resources...");
    let cer_api: Api<ClusterExtensionRevision> = Api::all(client.clone());
    match cer_api.list(&kube::api::ListParams::default()).await {
        Ok(list) => {
            info!("Found {} ClusterExtensionRevision resources", list.items.len());
            for cer in list.items {
                let name = cer.name_any();
                match cer_controller::reconcile(Arc::new(cer), context.clone()).await {
                    Ok(_) => debug!("ClusterExtensionRevision {} reconciled successfully", name),
                    Err(err) => warn!("Failed to reconcile ClusterExtensionRevision {}: {}", name, err),
                }
            }
        }
        Err(err) => warn!("Failed to list ClusterExtensionRevision resources: {}", err),
    }

    info!("Starting drift detection for Catalog cache entries...");
    let catalog_api: Api<Catalog> = Api::all(client.clone());
    match catalog_api.list(&kube::api::ListParams::default()).await {
        Ok(list) => {
            info!("Found {} Catalog resources", list.items.len());
            for catalog in list.items {
                let name = catalog.name_any();
                match catalog_cache_controller::reconcile(Arc::new(catalog), context.clone()).await {
                    Ok(_) => debug!("Catalog {} cache entry reconciled successfully", name),
                    Err(err) => warn!("Failed to reconcile Catalog {} cache entry: {}", name, err),
                }
            }
        }
        Err(err) => warn!("Failed to list Catalog resources: {}", err),
    }

    info!("Startup drift detection completed");
    Ok(())
}

async fn async_main() -> Result<()> {
    initialize_logging();
    info!("Starting clusterextension-operator");

    let (client, base_config) = initialize_services().await?;
    let settings = Arc::new(Settings::from_env());
    let context = initialize_shared_context(client.clone(), base_config, settings.clone()).await?;

    let _metrics_handle = start_metrics_server(settings.metrics_bind_address.clone());

    let leader_election = load_leader_election_config();

    if leader_election.enabled {
        let lease_manager: LeaseManager = LeaseManagerBuilder::new(client.clone(), &leader_election.lease_name)
            .with_namespace(&leader_election.lease_namespace)
            .with_identity(&leader_election.identity)
            .with_duration(leader_election.lease_duration)
            .with_grace(leader_election.retry_period)
            .build()
            .await?;
        let (leader_rx, lease_handle) = lease_manager.watch().await;

        info!("Waiting to acquire leadership...");
        let mut rx = leader_rx.clone();
        while !*rx.borrow_and_update() {
            rx.changed().await?;
        }
        info!("Leadership acquired");

        if let Err(err) = perform_startup_drift_detection(client.clone(), context.clone()).await {
            warn!(error = %err, "Startup drift detection failed, continuing");
        }

        run_operators_with_leader_election(context, leader_rx, lease_handle).await?;
    } else {
        info!("Leader election disabled");
        if let Err(err) = perform_startup_drift_detection(client.clone(), context.clone()).await {
            warn!(error = %err, "Startup drift detection failed, continuing");
        }

        run_operators_without_leader_election(context).await?;
    }

    info!("Graceful shutdown completed successfully");
    Ok(())
}

async fn monitor_leadership(mut leader_rx: tokio::sync::watch::Receiver<bool>) -> Result<()> {
    loop {
        leader_rx.changed().await?;
        if !*leader_rx.borrow() {
            anyhow::bail!("Leadership lost - stepping down");
        }
    }
}

async fn run_all_operators(context: Arc<Context>) -> Result<()> {
    tokio::select! {
        result = run_clusterextension_operator(context.clone()) => {
            error!("CRITICAL: ClusterExtension operator exited unexpectedly");
            result?;
            anyhow::bail!("ClusterExtension operator exited unexpectedly");
        }
        result = run_clusterextensionrevision_operator(context.clone()) => {
            error!("CRITICAL: ClusterExtensionRevision operator exited unexpectedly");
            result?;
            anyhow::bail!("ClusterExtensionRevision operator exited unexpectedly");
        }
        result = run_catalog_cache_operator(context) => {
            error!("CRITICAL: catalog-cache operator exited unexpectedly");
            result?;
            anyhow::bail!("catalog-cache operator exited unexpectedly");
        }
    }
}

async fn run_operators_with_leader_election(
    context: Arc<Context>,
    leader_rx: tokio::sync::watch::Receiver<bool>,
    _lease_handle: kube_lease_manager::LeaseManager,
) -> Result<()> {
    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down");
            Ok(())
        }
        #[cfg(unix)]
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
            Ok(())
        }
        #[cfg(not(unix))]
        _ = sigterm => {
            Ok(())
        }
        result = monitor_leadership(leader_rx) => result,
        result = run_all_operators(context) => result,
    }
}

async fn run_operators_without_leader_election(context: Arc<Context>) -> Result<()> {
    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down");
            Ok(())
        }
        #[cfg(unix)]
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
            Ok(())
        }
        #[cfg(not(unix))]
        _ = sigterm => {
            Ok(())
        }
        result = run_all_operators(context) => result,
    }
}

fn error_policy<T, C>(resource: Arc<T>, err: &ReconcileError, _ctx: Arc<C>) -> Action
where
    T: std::fmt::Debug,
{
    error!(
        error = %err,
        resource = ?resource,
        "Reconciliation error - will retry in {}s",
        constants::ERROR_REQUEUE_DURATION_SECS
    );
    Action::requeue(Duration::from_secs(constants::ERROR_REQUEUE_DURATION_SECS))
}
