//! End-to-end build: content → per-version corpus → index → global data.
//!
//! The build runs in two phases. [`Pipeline::prepare`] runs once the host has
//! loaded all content: it publishes every version and produces the data for
//! the runtime search widget. [`finalize`] runs after the static site has
//! been written and copies local artifacts into the output directory. The
//! version list travels between the two inside [`BuildResult`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::try_join_all;
use tracing::{info, instrument};

use docsearch_cloud::{CloudClient, RemoteIndex};
use docsearch_index::index_path;
use docsearch_shared::{
    AppConfig, CloudCredentials, DocSearchError, GlobalData, Result, SiteContent, VersionName,
};

use crate::corpus;
use crate::publisher::{self, IndexArtifact};

/// Host build mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    Development,
    #[default]
    Production,
}

impl BuildMode {
    /// Development only when `NODE_ENV` is exactly `development`.
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some("development") => BuildMode::Development,
            _ => BuildMode::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == BuildMode::Development
    }
}

/// Inputs for one build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Site root; `@site` in source locators resolves here.
    pub site_dir: PathBuf,
    /// Generated-files directory where local artifacts are staged.
    pub staging_dir: PathBuf,
    pub mode: BuildMode,
    pub config: AppConfig,
}

/// Output of [`Pipeline::prepare`].
#[derive(Debug)]
pub struct BuildResult {
    /// Versions of the first docs plugin, in its order.
    pub versions: Vec<VersionName>,
    /// One artifact per version, same order as `versions`.
    pub artifacts: Vec<IndexArtifact>,
    pub global_data: GlobalData,
    pub elapsed: Duration,
}

/// Progress callback for reporting build status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a version's corpus has been assembled.
    fn version_assembled(&self, version: &VersionName, sections: usize);
    /// Called when a version's index has been written or deployed.
    fn version_published(&self, artifact: &IndexArtifact);
    /// Called when `prepare` completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn version_assembled(&self, _version: &VersionName, _sections: usize) {}
    fn version_published(&self, _artifact: &IndexArtifact) {}
    fn done(&self, _result: &BuildResult) {}
}

/// The search build for one site.
pub struct Pipeline {
    options: BuildOptions,
    credentials: CloudCredentials,
    remote: Option<Arc<dyn RemoteIndex>>,
}

impl Pipeline {
    /// Pipeline that talks to the remote service over HTTP when a version
    /// resolves to a remote index.
    pub fn new(options: BuildOptions, credentials: CloudCredentials) -> Self {
        Self {
            options,
            credentials,
            remote: None,
        }
    }

    /// Pipeline with a caller-supplied remote index.
    pub fn with_remote(options: BuildOptions, remote: Arc<dyn RemoteIndex>) -> Self {
        Self {
            options,
            credentials: CloudCredentials::default(),
            remote: Some(remote),
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn remote_index(&self) -> Result<Arc<dyn RemoteIndex>> {
        match &self.remote {
            Some(remote) => Ok(Arc::clone(remote)),
            None => Ok(Arc::new(CloudClient::new(&self.credentials)?)),
        }
    }

    /// Publish every version and build the global data.
    ///
    /// Versions are processed concurrently; the first failing version fails
    /// the build. A missing private key is reported before any file is read
    /// or any request is made.
    #[instrument(skip_all, fields(mode = ?self.options.mode))]
    pub async fn prepare(
        &self,
        content: &SiteContent,
        progress: &dyn ProgressReporter,
    ) -> Result<BuildResult> {
        let start = Instant::now();
        let cloud = &self.options.config.cloud;

        // --- Phase 1: Resolve targets ---
        progress.phase("Resolving versions");
        content.validate()?;
        let versions = content.versions();

        let targets: Vec<(VersionName, Option<String>)> = versions
            .iter()
            .map(|v| (v.clone(), cloud.index_id_for(v).map(str::to_string)))
            .collect();

        let remote = if targets.iter().any(|(_, id)| id.is_some()) {
            Some(self.remote_index()?)
        } else {
            None
        };

        info!(
            versions = versions.len(),
            remote = remote.is_some(),
            deploy = cloud.should_deploy(),
            "starting search build"
        );

        // --- Phase 2: Assemble and publish ---
        progress.phase("Indexing content");
        let deploy = cloud.should_deploy();
        let site_dir = self.options.site_dir.as_path();
        let staging_dir = self.options.staging_dir.as_path();
        let remote = remote.as_deref();

        let tasks = targets.iter().map(|(version, index_id)| async move {
            let corpus = corpus::assemble(site_dir, content.content_for(version)).await?;
            progress.version_assembled(version, corpus.len());

            let artifact = match (index_id, remote) {
                (Some(index_id), Some(remote)) => IndexArtifact::Remote(
                    publisher::publish_remote(remote, version, index_id, deploy, &corpus).await?,
                ),
                _ => IndexArtifact::Local(publisher::publish_local(staging_dir, version, corpus)?),
            };

            progress.version_published(&artifact);
            Ok::<_, DocSearchError>(artifact)
        });
        let artifacts = try_join_all(tasks).await?;

        // --- Phase 3: Global data ---
        progress.phase("Building global data");
        let global_data = self.global_data(content, &artifacts).await?;

        let result = BuildResult {
            versions,
            artifacts,
            global_data,
            elapsed: start.elapsed(),
        };

        info!(elapsed_ms = result.elapsed.as_millis() as u64, "search build complete");
        progress.done(&result);

        Ok(result)
    }

    async fn global_data(
        &self,
        content: &SiteContent,
        artifacts: &[IndexArtifact],
    ) -> Result<GlobalData> {
        let cloud_enabled = self.options.config.cloud.is_enabled();

        let endpoints = cloud_enabled.then(|| {
            artifacts
                .iter()
                .filter_map(|a| match a {
                    IndexArtifact::Remote(endpoint) => Some(endpoint.clone()),
                    IndexArtifact::Local(_) => None,
                })
                .collect()
        });

        let mut data = GlobalData {
            plugin_content_docs_ids: content.plugin_ids(),
            endpoints,
            analytics: None,
            search_data: Some(BTreeMap::new()),
        };

        if self.options.mode.is_development() {
            data.analytics = self.options.config.analytics.clone();
            data.search_data = if cloud_enabled {
                None
            } else {
                Some(read_search_data(artifacts).await?)
            };
        }

        Ok(data)
    }
}

/// Compressed local index bytes keyed by version.
async fn read_search_data(artifacts: &[IndexArtifact]) -> Result<BTreeMap<String, Vec<u8>>> {
    let reads = artifacts.iter().filter_map(|a| match a {
        IndexArtifact::Local(local) => Some(async move {
            let bytes = tokio::fs::read(&local.meta.path)
                .await
                .map_err(|e| DocSearchError::io(&local.meta.path, e))?;
            Ok::<_, DocSearchError>((local.version.to_string(), bytes))
        }),
        IndexArtifact::Remote(_) => None,
    });

    Ok(try_join_all(reads).await?.into_iter().collect())
}

/// Copy every staged local artifact into `out_dir`.
///
/// Returns the destination paths in version order. Remote versions have
/// nothing to copy.
#[instrument(skip_all, fields(out_dir = %out_dir.display()))]
pub async fn finalize(out_dir: &Path, result: &BuildResult) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|e| DocSearchError::io(out_dir, e))?;

    let copies = result.artifacts.iter().filter_map(|artifact| match artifact {
        IndexArtifact::Local(local) => Some(async move {
            let dest = index_path(out_dir, &local.version);
            tokio::fs::copy(&local.meta.path, &dest)
                .await
                .map_err(|e| DocSearchError::io(&local.meta.path, e))?;
            Ok::<_, DocSearchError>(dest)
        }),
        IndexArtifact::Remote(_) => None,
    });

    let copied = try_join_all(copies).await?;
    info!(copied = copied.len(), "artifacts copied to output");
    Ok(copied)
}
