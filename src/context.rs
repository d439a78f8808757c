// SPDX-License-Identifier: MIT

//! Shared context passed to every controller.
//!
//! Bundles the Kubernetes client, reflector stores for in-memory label
//! lookups, metrics, the external collaborators (resolver, puller, token
//! minter, release store, content manager), and a cache of per-identity
//! scoped clients.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use kube::runtime::reflector::Store;
use kube::{Client, Config};

use crate::catalog_cache::CatalogCache;
use crate::crd::{Catalog, ClusterExtension, ClusterExtensionRevision};
use crate::external::{ContentManager, ImagePuller, ReleaseStore, Resolver, TokenMinter};
use crate::metrics::Metrics;
use crate::settings::Settings;

/// Shared context passed to all controllers.
#[derive(Clone)]
pub struct Context {
    pub client: Client,
    /// Anonymous base config scoped clients are minted from (§5: "MUST be
    /// anonymous base config + per-request token injection").
    pub base_config: Config,
    pub stores: Stores,
    pub metrics: Metrics,
    pub settings: Arc<Settings>,
    pub resolver: Arc<dyn Resolver>,
    pub puller: Arc<dyn ImagePuller>,
    pub token_minter: Arc<dyn TokenMinter>,
    pub release_store: Arc<dyn ReleaseStore>,
    pub content_manager: Arc<dyn ContentManager>,
    pub scoped_clients: ScopedClientCache,
    pub catalog_cache: Arc<CatalogCache>,
}

/// Collection of reflector stores for cross-controller queries.
#[derive(Clone)]
pub struct Stores {
    pub cluster_extensions: Store<ClusterExtension>,
    pub cluster_extension_revisions: Store<ClusterExtensionRevision>,
    pub catalogs: Store<Catalog>,
}

/// Caches one scoped [`Client`] per `(namespace, serviceAccountName)` identity.
///
/// The client's credentials are minted once, at first use, via the
/// [`TokenMinter`] collaborator. Callers are expected to evict an identity's
/// entry when the owning `ClusterExtension` is deleted so a revoked or
/// rotated identity cannot outlive it.
#[derive(Clone, Default)]
pub struct ScopedClientCache {
    inner: Arc<Mutex<HashMap<(String, String), Client>>>,
}

impl ScopedClientCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached client for `(namespace, service_account_name)`,
    /// minting and building one if absent.
    pub async fn get_or_create(
        &self,
        base_config: &Config,
        token_minter: &dyn TokenMinter,
        namespace: &str,
        service_account_name: &str,
    ) -> anyhow::Result<Client> {
        let key = (namespace.to_string(), service_account_name.to_string());
        if let Some(client) = self.inner.lock().expect("scoped client cache lock").get(&key) {
            return Ok(client.clone());
        }

        let token = token_minter.mint(namespace, service_account_name).await?;
        let mut config = base_config.clone();
        config.auth_info.token = Some(token.into());
        let client = Client::try_from(config)?;

        self.inner
            .lock()
            .expect("scoped client cache lock")
            .insert(key, client.clone());
        Ok(client)
    }

    /// Evicts every scoped client minted for `namespace`, e.g. when the
    /// owning `ClusterExtension` is deleted.
    pub fn evict_namespace(&self, namespace: &str) {
        self.inner
            .lock()
            .expect("scoped client cache lock")
            .retain(|(ns, _), _| ns != namespace);
    }
}
