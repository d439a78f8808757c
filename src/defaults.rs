// SPDX-License-Identifier: MIT

//! Default implementations of the out-of-scope collaborator traits (§ `external`).
//!
//! [`Resolver`] and [`ImagePuller`] encode algorithms this crate intentionally
//! does not implement (catalog content parsing, image pulling/caching); the
//! defaults here fail clearly rather than pretend to resolve anything, so a
//! deployment that forgets to wire a real implementation finds out at the
//! first reconcile instead of silently doing nothing. [`TokenMinter`] and
//! [`ReleaseStore`] have one obvious in-cluster implementation each, so those
//! are provided for real: a `TokenRequest` minter and a `Secret`-backed
//! release history, mirroring how Helm itself stores release state.

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::authentication::v1::{TokenRequest, TokenRequestSpec};
use k8s_openapi::api::core::v1::{Secret, ServiceAccount};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::Client;

use crate::external::{
    ContentManager, ImageFilesystem, ImagePuller, PullError, ReleaseHistoryEntry, ReleaseStore, ResolveError,
    ResolveRequest, ResolvedBundle, Resolver, TokenMinter,
};

/// Fails every resolution with a terminal error naming the missing collaborator.
pub struct UnimplementedResolver;

#[async_trait]
impl Resolver for UnimplementedResolver {
    async fn resolve(&self, _request: &ResolveRequest) -> Result<ResolvedBundle, ResolveError> {
        Err(ResolveError::Terminal {
            reason: "no Resolver configured for this deployment".to_string(),
        })
    }
}

/// Fails every pull; never silently no-ops, since a quiet success here would
/// leave a `ClusterExtension` reporting progress it never made.
pub struct UnimplementedImagePuller;

#[async_trait]
impl ImagePuller for UnimplementedImagePuller {
    async fn pull(&self, _image_ref: &str) -> Result<Box<dyn ImageFilesystem>, PullError> {
        Err(PullError::Transient(anyhow::anyhow!("no ImagePuller configured for this deployment")))
    }
}

/// Mints scoped tokens via the `ServiceAccount` `token` subresource.
pub struct ServiceAccountTokenMinter {
    client: Client,
    token_duration_secs: i64,
}

impl ServiceAccountTokenMinter {
    #[must_use]
    pub fn new(client: Client, token_duration_secs: i64) -> Self {
        Self { client, token_duration_secs }
    }
}

#[async_trait]
impl TokenMinter for ServiceAccountTokenMinter {
    async fn mint(&self, namespace: &str, service_account_name: &str) -> anyhow::Result<String> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        let request = TokenRequest {
            spec: TokenRequestSpec {
                expiration_seconds: Some(self.token_duration_secs),
                ..Default::default()
            },
            ..Default::default()
        };
        let data = serde_json::to_vec(&request)?;
        let response: TokenRequest =
            api.create_subresource("token", service_account_name, &PostParams::default(), data).await?;
        response
            .status
            .map(|status| status.token)
            .ok_or_else(|| anyhow::anyhow!("token request for {namespace}/{service_account_name} returned no status"))
    }
}

/// Stores one release's rollout history as a single `Secret`, one field per
/// history entry index, the way Helm itself persists release metadata.
pub struct SecretReleaseStore {
    client: Client,
    namespace: String,
}

impl SecretReleaseStore {
    #[must_use]
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self { client, namespace: namespace.into() }
    }

    fn secret_name(release_name: &str) -> String {
        format!("clusterextension-release-{release_name}")
    }
}

#[async_trait]
impl ReleaseStore for SecretReleaseStore {
    async fn history(&self, release_name: &str) -> anyhow::Result<Vec<ReleaseHistoryEntry>> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), &self.namespace);
        let secret = match api.get_opt(&Self::secret_name(release_name)).await? {
            Some(secret) => secret,
            None => return Ok(Vec::new()),
        };
        let Some(data) = secret.data.as_ref().and_then(|d| d.get("history")) else {
            return Ok(Vec::new());
        };
        Ok(serde_json::from_slice(&data.0)?)
    }

    async fn record(&self, release_name: &str, entry: ReleaseHistoryEntry) -> anyhow::Result<()> {
        let mut history = self.history(release_name).await?;
        history.push(entry);
        let encoded = serde_json::to_vec(&history)?;

        let mut data = BTreeMap::new();
        data.insert("history".to_string(), ByteString(encoded));

        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(Self::secret_name(release_name)),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            data: Some(data),
            type_: Some("olm.example.io/release-history".to_string()),
            ..Default::default()
        };

        let api: Api<Secret> = Api::namespaced(self.client.clone(), &self.namespace);
        api.patch(&Self::secret_name(release_name), &PatchParams::apply("clusterextension-operator"), &Patch::Apply(&secret))
            .await?;
        Ok(())
    }
}

/// Logs the objects an applier just wrote; garbage collection of objects that
/// fall out of a bundle's manifest set is out of scope (see `external.rs`).
pub struct LoggingContentManager;

#[async_trait]
impl ContentManager for LoggingContentManager {
    async fn watch_objects(&self, owner: &str, object_refs: &[String]) -> anyhow::Result<()> {
        tracing::debug!(owner, count = object_refs.len(), "registered objects for watch");
        Ok(())
    }
}

#[cfg(test)]
#[path = "defaults_tests.rs"]
mod defaults_tests;
