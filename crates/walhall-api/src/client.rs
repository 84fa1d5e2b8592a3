//! The Walhall Core client: dependent resolution chain and mutations.
//!
//! A [`WalhallClient`] is constructed once per inbound gateway request from
//! that request's bearer token and is never shared across requests or
//! threads. Claims are decoded (not verified — Walhall Core performs the
//! authoritative authorization) at construction; all operations then execute
//! sequentially, suspending only at the transport boundary.
//!
//! Listings whose results feed later resolution steps (`list_orgs`,
//! `list_apps`, `list_envs`) memoize their results in the client's
//! [`ResolutionCache`]. Module listings are intentionally never cached: they
//! change underneath the adaptor via the repository-sync trigger, so every
//! call re-fetches. Mutations always hit upstream directly and do not
//! invalidate cached listings; staleness is bounded by the client's
//! one-request lifetime.

use std::collections::HashMap;

use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{self, CachedLookup, ResolutionCache};
use crate::claims::Claims;
use crate::error::{ApiError, ApiResult, TransportError};
use crate::transport::{Transport, UpstreamRequest, UpstreamResponse};
use crate::types::{Configuration, Environment, Module, ModuleVersion};

/// Client for one authenticated identity against Walhall Core.
#[derive(Debug)]
pub struct WalhallClient<T> {
    claims: Claims,
    token: String,
    transport: T,
    cache: ResolutionCache,
}

/// Single-page result envelope used by most upstream listings.
#[derive(Deserialize)]
struct Page<R> {
    #[serde(default)]
    results: Vec<R>,
}

#[derive(Deserialize)]
struct UserDetail {
    #[serde(default)]
    organizations: Vec<OrgEntry>,
}

#[derive(Deserialize)]
struct OrgEntry {
    #[serde(rename = "organization_uuid")]
    uuid: String,
    name: String,
}

#[derive(Default, Deserialize)]
struct AppEntry {
    #[serde(rename = "app_uuid")]
    uuid: String,
    name: String,
}

#[derive(Deserialize)]
struct SyncStatus {
    #[serde(default)]
    status: String,
}

#[derive(Serialize)]
struct VersionSet<'a> {
    logic_module_version_ids: &'a [i64],
}

#[derive(Serialize)]
struct NewConfiguration<'a> {
    #[serde(rename = "type")]
    config_type: &'a str,
    logic_module_version: i64,
    environment: &'a str,
}

impl<T: Transport> WalhallClient<T> {
    /// Construct a client from a bearer token, decoding its claims once.
    ///
    /// Accepts the token with or without a `"JWT "` prefix; the prefix is
    /// normalized back on for upstream calls.
    pub fn new(token: &str, transport: T) -> ApiResult<Self> {
        let raw = token.strip_prefix("JWT ").unwrap_or(token);
        let claims = Claims::from_token(raw)?;

        Ok(Self {
            claims,
            token: format!("JWT {raw}"),
            transport,
            cache: ResolutionCache::new(),
        })
    }

    /// Username of the authenticated caller.
    pub fn current_user(&self) -> &str {
        &self.claims.username
    }

    /// The decoded (unverified) claims.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    fn request(&self, method: Method, path: &str) -> UpstreamRequest {
        UpstreamRequest::new(method, path).with_token(&self.token)
    }

    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        debug!(method = %request.method(), path = request.path(), "walhall core request");
        self.transport.execute(request).await
    }

    fn decode<R: DeserializeOwned>(
        path: &str,
        response: &UpstreamResponse,
        entity: &str,
    ) -> ApiResult<R> {
        if response.status() != StatusCode::OK {
            return Err(ApiError::from_status(response.status(), entity));
        }
        response.json().map_err(|e| ApiError::Decode {
            path: path.to_string(),
            source: e,
        })
    }

    async fn fetch<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        entity: &str,
    ) -> ApiResult<R> {
        let response = self.send(self.request(method, path)).await?;
        Self::decode(path, &response, entity)
    }

    /// List the caller's orgs as a name → UUID map, excluding the self-org.
    ///
    /// The org named identically to the caller's username is the implicit
    /// personal org and is filtered out here, not by upstream. Cached for
    /// the lifetime of this client.
    pub async fn list_orgs(&mut self) -> ApiResult<HashMap<String, String>> {
        let key = cache::orgs_key();
        if let Some(orgs) = self.cache.names(&key) {
            return Ok(orgs.clone());
        }

        let path = format!("/api/walhalluser/{}", self.claims.user_uuid);
        let detail: UserDetail = self
            .fetch(Method::GET, &path, &self.claims.username)
            .await?;

        let orgs: HashMap<String, String> = detail
            .organizations
            .into_iter()
            .filter(|org| org.name != self.claims.username)
            .map(|org| (org.name, org.uuid))
            .collect();

        self.cache.put(key, CachedLookup::Names(orgs.clone()));
        Ok(orgs)
    }

    /// Resolve an org name to its UUID via the (cached) org listing.
    async fn resolve_org(&mut self, org_name: &str) -> ApiResult<String> {
        let orgs = self.list_orgs().await?;
        orgs.get(org_name)
            .cloned()
            .ok_or_else(|| ApiError::unknown_name(org_name))
    }

    /// List the apps of one org as a name → UUID map.
    ///
    /// Fails with [`ApiError::UnknownName`] before any app call when the org
    /// name is absent from the org listing. Cached for the lifetime of this
    /// client.
    pub async fn list_apps(&mut self, org_name: &str) -> ApiResult<HashMap<String, String>> {
        let key = cache::apps_key(org_name);
        if let Some(apps) = self.cache.names(&key) {
            return Ok(apps.clone());
        }

        let org_uuid = self.resolve_org(org_name).await?;
        let path = format!("/api/application?limit=100&organization_uuid={org_uuid}");
        let page: Page<AppEntry> = self
            .fetch(Method::GET, &path, &self.claims.username)
            .await?;

        let apps: HashMap<String, String> = page
            .results
            .into_iter()
            .map(|app| (app.name, app.uuid))
            .collect();

        self.cache.put(key, CachedLookup::Names(apps.clone()));
        Ok(apps)
    }

    /// List the internal modules of one org, with their nested versions.
    ///
    /// Never cached: the module list is expected to change via
    /// [`refresh_modules`](Self::refresh_modules).
    pub async fn list_modules(&mut self, org_name: &str) -> ApiResult<Vec<Module>> {
        let org_uuid = self.resolve_org(org_name).await?;
        let path = format!("/api/logicmodule?organization={org_uuid}&limit=50&status=internal");
        let page: Page<Module> = self
            .fetch(Method::GET, &path, &self.claims.username)
            .await?;
        Ok(page.results)
    }

    /// Trigger a repository sync for one org, returning the upstream status
    /// string verbatim.
    pub async fn refresh_modules(&mut self, org_name: &str) -> ApiResult<String> {
        let org_uuid = self.resolve_org(org_name).await?;
        let path = format!("/api/repositories/github/sync?organization_uuid={org_uuid}");
        let status: SyncStatus = self
            .fetch(Method::POST, &path, &self.claims.username)
            .await?;
        Ok(status.status)
    }

    /// Poll the repository-sync status for one org.
    ///
    /// Not cached: the status is expected to change between polls.
    pub async fn refresh_modules_status(&mut self, org_name: &str) -> ApiResult<String> {
        let org_uuid = self.resolve_org(org_name).await?;
        let path = format!("/api/repositories/github/status?organization_uuid={org_uuid}");
        let status: SyncStatus = self
            .fetch(Method::GET, &path, &self.claims.username)
            .await?;
        Ok(status.status)
    }

    /// List the environments of one app, resolving org → app first.
    ///
    /// Cached for the lifetime of this client.
    pub async fn list_envs(
        &mut self,
        org_name: &str,
        app_name: &str,
    ) -> ApiResult<Vec<Environment>> {
        let key = cache::envs_key(org_name, app_name);
        if let Some(envs) = self.cache.environments(&key) {
            return Ok(envs.to_vec());
        }

        let apps = self.list_apps(org_name).await?;
        let app_uuid = apps
            .get(app_name)
            .cloned()
            .ok_or_else(|| ApiError::unknown_name(app_name))?;

        let path = format!("/api/environments?application={app_uuid}");
        let page: Page<Environment> = self
            .fetch(Method::GET, &path, &self.claims.username)
            .await?;

        self.cache
            .put(key, CachedLookup::Environments(page.results.clone()));
        Ok(page.results)
    }

    /// Find one environment by exact, case-sensitive name match.
    ///
    /// First match wins; a miss is an [`ApiError::UnknownName`], not an
    /// upstream 404 — upstream has no by-name environment endpoint.
    pub async fn get_env(
        &mut self,
        org_name: &str,
        app_name: &str,
        env_name: &str,
    ) -> ApiResult<Environment> {
        let envs = self.list_envs(org_name, app_name).await?;
        envs.into_iter()
            .find(|env| env.name == env_name)
            .ok_or_else(|| ApiError::unknown_name(env_name))
    }

    /// Replace the set of module-version ids deployed in an environment.
    pub async fn patch_env(
        &self,
        env: &Environment,
        module_version_ids: &[i64],
    ) -> ApiResult<Environment> {
        let path = format!("/api/environments/{}", env.uuid);
        let entity = format!("environment {}", env.uuid);
        let request = self.request(Method::PATCH, &path).with_json(&VersionSet {
            logic_module_version_ids: module_version_ids,
        })?;
        let response = self.send(request).await?;
        Self::decode(&path, &response, &entity)
    }

    /// Remove one module version from an environment, returning the updated
    /// environment.
    pub async fn delete_module_version_from_env(
        &self,
        env: &Environment,
        version: &ModuleVersion,
    ) -> ApiResult<Environment> {
        let path = format!("/api/environments/{}/remove/{}", env.uuid, version.uuid);
        let entity = format!("environment {}", env.uuid);
        self.fetch(Method::DELETE, &path, &entity).await
    }

    /// List the configurations attached to one (environment, module version)
    /// pair.
    ///
    /// Not cached: the caller itself mutates configuration sets frequently.
    pub async fn configs_for_module_version_in_env(
        &self,
        env: &Environment,
        version: &ModuleVersion,
    ) -> ApiResult<Vec<Configuration>> {
        let path = format!(
            "/api/configuration?logic_module_version={}&environment={}",
            version.id, env.uuid
        );
        let entity = format!("environment {}", env.uuid);
        let page: Page<Configuration> = self.fetch(Method::GET, &path, &entity).await?;
        Ok(page.results)
    }

    /// Create an empty configuration of the given type for a (environment,
    /// module version) pair, returning the created configuration — intended
    /// to be followed by [`update_configuration`](Self::update_configuration).
    pub async fn create_configuration(
        &self,
        env: &Environment,
        version: &ModuleVersion,
        config_type: &str,
    ) -> ApiResult<Configuration> {
        let path = "/api/configuration";
        let entity = format!("environment {}", env.uuid);
        let request = self
            .request(Method::POST, path)
            .with_json(&NewConfiguration {
                config_type,
                logic_module_version: version.id,
                environment: &env.uuid,
            })?;
        let response = self.send(request).await?;

        // Upstream has answered both 201 and 200 for creations.
        if response.status() != StatusCode::CREATED && response.status() != StatusCode::OK {
            return Err(ApiError::from_status(response.status(), entity));
        }
        response.json().map_err(|e| ApiError::Decode {
            path: path.to_string(),
            source: e,
        })
    }

    /// Full-replacement update of a configuration by its id, returning the
    /// configuration echoed back by upstream.
    pub async fn update_configuration(&self, config: &Configuration) -> ApiResult<Configuration> {
        let path = format!("/api/configuration/{}", config.id);
        let entity = format!("configuration {}", config.id);
        let request = self.request(Method::PUT, &path).with_json(config)?;
        let response = self.send(request).await?;
        Self::decode(&path, &response, &entity)
    }

    /// Delete a configuration by its id.
    pub async fn delete_configuration(&self, config_id: i64) -> ApiResult<()> {
        let path = format!("/api/configuration/{config_id}");
        let entity = format!("configuration {config_id}");
        let response = self.send(self.request(Method::DELETE, &path)).await?;
        if response.status() != StatusCode::OK {
            return Err(ApiError::from_status(response.status(), entity));
        }
        Ok(())
    }

    /// Deploy the environment's current configuration set to its cluster.
    pub async fn deploy_to_environment(&self, env: &Environment) -> ApiResult<()> {
        let path = format!("/api/environments/{}/deploy", env.uuid);
        let entity = format!("environment {}", env.uuid);
        let request = self
            .request(Method::PUT, &path)
            .with_json(&serde_json::json!({}))?;
        let response = self.send(request).await?;
        if response.status() != StatusCode::OK {
            return Err(ApiError::from_status(response.status(), entity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_to_empty_results() {
        let page: Page<Module> = serde_json::from_str("{}").unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_new_configuration_wire_shape() {
        let body = serde_json::to_value(NewConfiguration {
            config_type: "config_map",
            logic_module_version: 18862,
            environment: "fa9852ef",
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "type": "config_map",
                "logic_module_version": 18862,
                "environment": "fa9852ef"
            })
        );
    }

    #[test]
    fn test_version_set_wire_shape() {
        let body = serde_json::to_value(VersionSet {
            logic_module_version_ids: &[18862, 11925],
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"logic_module_version_ids": [18862, 11925]})
        );
    }
}
