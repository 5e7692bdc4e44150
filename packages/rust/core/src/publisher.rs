//! Index publishing: a compressed local artifact or a remote index.

use std::path::Path;

use tracing::{info, instrument};

use docsearch_cloud::RemoteIndex;
use docsearch_index::{ArtifactMeta, SearchIndex, compress, index_path, write_artifact};
use docsearch_shared::{Endpoint, Result, SectionRecord, VersionName};

/// A local artifact written to the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifact {
    pub version: VersionName,
    pub meta: ArtifactMeta,
}

/// Outcome of publishing one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexArtifact {
    Local(LocalArtifact),
    Remote(Endpoint),
}

impl IndexArtifact {
    pub fn version(&self) -> &VersionName {
        match self {
            IndexArtifact::Local(local) => &local.version,
            IndexArtifact::Remote(endpoint) => &endpoint.v,
        }
    }
}

/// Build a local index from `corpus` and write it to
/// `<staging_dir>/orama-search-index-<version>.json.gz`.
#[instrument(skip(corpus), fields(staging = %staging_dir.display(), sections = corpus.len()))]
pub fn publish_local(
    staging_dir: &Path,
    version: &VersionName,
    corpus: Vec<SectionRecord>,
) -> Result<LocalArtifact> {
    let mut index = SearchIndex::new()?;
    index.insert_multiple(corpus)?;

    let bytes = compress(&index.to_json()?)?;
    let meta = write_artifact(&index_path(staging_dir, version), &bytes)?;

    info!(
        path = %meta.path.display(),
        size_bytes = meta.size_bytes,
        documents = index.len(),
        "local index written"
    );

    Ok(LocalArtifact {
        version: version.clone(),
        meta,
    })
}

/// Publish `corpus` to a remote index.
///
/// Access is always checked first. With `deploy` set the corpus is uploaded
/// as a snapshot and then deployed; a failed snapshot never reaches deploy.
/// Without it the remote index is left untouched and only its query
/// credentials are returned.
#[instrument(skip(remote, corpus), fields(sections = corpus.len()))]
pub async fn publish_remote(
    remote: &dyn RemoteIndex,
    version: &VersionName,
    index_id: &str,
    deploy: bool,
    corpus: &[SectionRecord],
) -> Result<Endpoint> {
    let grant = remote.check_access(index_id).await?;

    if deploy {
        remote.snapshot(index_id, corpus).await?;
        remote.deploy(index_id).await?;
        info!(%index_id, "remote index deployed");
    }

    Ok(Endpoint {
        v: version.clone(),
        endpoint: grant.endpoint,
        api_key: grant.api_key,
    })
}
