//! `RuntimeManager`: the entry point front-ends talk to.
//!
//! Operations on one kind are serialised by a per-kind lock; different
//! kinds proceed in parallel and only meet at the [`Environment`]
//! coordinator.

use std::path::Path;
use std::sync::Arc;

use fluffbox_schema::{
    Accessibility, Activation, InstallOutcome, InstalledVersions, Platform, Release, RuntimeKind,
};
use tokio::sync::Mutex;

use crate::catalog;
use crate::config::Config;
use crate::env::Environment;
use crate::ops::{self, Context, ManagerError};
use crate::registry;
use crate::runtimes::{self, Runtime};
use crate::Reporter;

pub struct RuntimeManager {
    ctx: Context,
    runtimes: [Arc<dyn Runtime>; 3],
    locks: [Mutex<()>; 3],
}

impl std::fmt::Debug for RuntimeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeManager")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl RuntimeManager {
    /// Manager for the host platform, persisting variables the host's way.
    ///
    /// # Errors
    ///
    /// Fails on unsupported hosts and if the HTTP client cannot be built.
    pub fn new(config: &Config, reporter: Arc<dyn Reporter>) -> Result<Self, ManagerError> {
        let platform = Platform::detect()?;
        let env = Arc::new(Environment::for_host(platform.os, &config.home));
        Self::with_parts(config, platform, env, reporter)
    }

    /// Manager with an explicit platform and environment store.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn with_parts(
        config: &Config,
        platform: Platform,
        env: Arc<Environment>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, ManagerError> {
        let client = config
            .http_client()
            .map_err(|e| ManagerError::Network(e.to_string()))?;

        let runtimes = RuntimeKind::ALL.map(|kind| runtimes::for_kind(kind, config, platform));

        Ok(Self {
            ctx: Context {
                home: config.home.clone(),
                platform,
                client,
                env,
                reporter,
            },
            runtimes,
            locks: [Mutex::new(()), Mutex::new(()), Mutex::new(())],
        })
    }

    pub fn home(&self) -> &Path {
        &self.ctx.home
    }

    pub fn platform(&self) -> Platform {
        self.ctx.platform
    }

    pub fn runtime(&self, kind: RuntimeKind) -> &dyn Runtime {
        self.runtimes[kind.index()].as_ref()
    }

    /// Releases installable on this platform, newest first.
    pub async fn list_available(&self, kind: RuntimeKind) -> Result<Vec<Release>, ManagerError> {
        self.ctx.reporter.section(&format!("Fetching {} releases", kind.display_name()));
        Ok(catalog::resolve(self.runtime(kind), &self.ctx.client).await?)
    }

    pub fn list_installed(&self, kind: RuntimeKind) -> Result<InstalledVersions, ManagerError> {
        Ok(registry::installed(self.runtime(kind), &self.ctx.home)?)
    }

    pub async fn check_accessible(&self, kind: RuntimeKind) -> Accessibility {
        ops::check_accessible(&self.ctx, self.runtime(kind)).await
    }

    /// Install a release previously returned by [`Self::list_available`].
    pub async fn install(
        &self,
        kind: RuntimeKind,
        release: &Release,
    ) -> Result<InstallOutcome, ManagerError> {
        let _guard = self.locks[kind.index()].lock().await;
        ops::install_release(&self.ctx, self.runtime(kind), release).await
    }

    /// Install `version`, resolving its release from the catalog.
    ///
    /// An existing version directory short-circuits before any network access.
    pub async fn install_version(
        &self,
        kind: RuntimeKind,
        version: &str,
    ) -> Result<InstallOutcome, ManagerError> {
        let runtime = self.runtime(kind);
        let dir = registry::version_dir(runtime, &self.ctx.home, version).ok_or_else(|| {
            ManagerError::NotFound {
                kind,
                version: version.to_string(),
            }
        })?;
        if dir.exists() {
            return Ok(InstallOutcome::AlreadyPresent);
        }

        let wanted = runtime.version_dir_name(version);
        let release = self
            .list_available(kind)
            .await?
            .into_iter()
            .find(|r| runtime.version_dir_name(&r.version) == wanted)
            .ok_or_else(|| ManagerError::NotFound {
                kind,
                version: version.to_string(),
            })?;

        self.install(kind, &release).await
    }

    pub async fn activate(&self, kind: RuntimeKind, version: &str) -> Result<Activation, ManagerError> {
        let _guard = self.locks[kind.index()].lock().await;
        ops::activate(&self.ctx, self.runtime(kind), version).await
    }

    pub async fn delete(&self, kind: RuntimeKind, version: &str) -> Result<(), ManagerError> {
        let _guard = self.locks[kind.index()].lock().await;
        ops::delete_version(&self.ctx, self.runtime(kind), version).await
    }

    pub async fn clear(&self, kind: RuntimeKind) -> Result<usize, ManagerError> {
        let _guard = self.locks[kind.index()].lock().await;
        ops::clear_all(&self.ctx, self.runtime(kind)).await
    }

    pub async fn run(
        &self,
        kind: RuntimeKind,
        program: &str,
        args: &[String],
    ) -> Result<String, ManagerError> {
        ops::run_with_active(&self.ctx, self.runtime(kind), program, args).await
    }
}
