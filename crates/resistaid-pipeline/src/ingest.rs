//! Catalog loader.
//!
//! Seeds the vector store from a directory of JSON arrays, one file per
//! collection. Missing files load as empty collections.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use resistaid_common::{AnalysisReport, ResistaidError, Result};
use resistaid_db::{
    initialize, AntibodyTemplate, CollectionRecord, ExperimentRecord, ImageRecord, LabNote,
    LiteratureRecord, MutationProfile, ProtocolRecord, TypedCollection, VectorStore,
};
use resistaid_embed::Embedder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub mutations: Vec<MutationProfile>,
    #[serde(default)]
    pub antibodies: Vec<AntibodyTemplate>,
    #[serde(default)]
    pub literature: Vec<LiteratureRecord>,
    #[serde(default)]
    pub experiments: Vec<ExperimentRecord>,
    #[serde(default)]
    pub protocols: Vec<ProtocolRecord>,
    #[serde(default)]
    pub lab_notes: Vec<LabNote>,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
}

impl Catalog {
    /// Read `<collection>.json` for every catalog collection under `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            mutations: load_file(dir)?,
            antibodies: load_file(dir)?,
            literature: load_file(dir)?,
            experiments: load_file(dir)?,
            protocols: load_file(dir)?,
            lab_notes: load_file(dir)?,
            images: load_file(dir)?,
        })
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
            + self.antibodies.len()
            + self.literature.len()
            + self.experiments.len()
            + self.protocols.len()
            + self.lab_notes.len()
            + self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn load_file<T: CollectionRecord>(dir: &Path) -> Result<Vec<T>> {
    let path = dir.join(format!("{}.json", T::COLLECTION));
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path)
        .map_err(|e| ResistaidError::Config(format!("{}: {e}", path.display())))?;
    parse_records(&content).map_err(|e| ResistaidError::Config(format!("{}: {e}", path.display())))
}

fn parse_records<T: DeserializeOwned>(content: &str) -> serde_json::Result<Vec<T>> {
    serde_json::from_str(content)
}

/// Create every collection and upsert the catalog; returns records written
/// per collection.
#[instrument(skip_all, fields(records = catalog.len()))]
pub async fn index_catalog(
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    catalog: &Catalog,
) -> Result<BTreeMap<String, usize>> {
    initialize(store.as_ref(), embedder.dim()).await?;
    let mut counts = BTreeMap::new();
    counts.insert(MutationProfile::COLLECTION.to_string(), index(&store, embedder.as_ref(), &catalog.mutations).await?);
    counts.insert(AntibodyTemplate::COLLECTION.to_string(), index(&store, embedder.as_ref(), &catalog.antibodies).await?);
    counts.insert(LiteratureRecord::COLLECTION.to_string(), index(&store, embedder.as_ref(), &catalog.literature).await?);
    counts.insert(ExperimentRecord::COLLECTION.to_string(), index(&store, embedder.as_ref(), &catalog.experiments).await?);
    counts.insert(ProtocolRecord::COLLECTION.to_string(), index(&store, embedder.as_ref(), &catalog.protocols).await?);
    counts.insert(LabNote::COLLECTION.to_string(), index(&store, embedder.as_ref(), &catalog.lab_notes).await?);
    counts.insert(ImageRecord::COLLECTION.to_string(), index(&store, embedder.as_ref(), &catalog.images).await?);
    info!(?counts, "Catalog indexed");
    Ok(counts)
}

async fn index<T: CollectionRecord>(
    store: &Arc<dyn VectorStore>,
    embedder: &dyn Embedder,
    records: &[T],
) -> Result<usize> {
    if records.is_empty() {
        return Ok(0);
    }
    let texts: Vec<String> = records.iter().map(|r| r.embedding_text()).collect();
    let embeddings = embedder.embed(&texts).await?;
    let collection = TypedCollection::<T>::new(store.clone());
    for (record, embedding) in records.iter().zip(embeddings) {
        collection.upsert(record, embedding).await?;
    }
    Ok(records.len())
}

/// `report_{MUTATION}_{YYYYmmddTHHMMSS}.json` under `dir`.
pub fn report_path(dir: &Path, report: &AnalysisReport) -> PathBuf {
    dir.join(format!(
        "report_{}_{}.json",
        report.mutation_id,
        report.created_at.format("%Y%m%dT%H%M%S")
    ))
}

/// Best-effort report archive; failures are logged and swallowed.
pub async fn archive_report(dir: &Path, report: &AnalysisReport) -> Option<PathBuf> {
    let path = report_path(dir, report);
    let body = match serde_json::to_vec_pretty(report) {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "Report serialisation failed, not archived");
            return None;
        }
    };
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        warn!(dir = %dir.display(), error = %e, "Report directory unavailable, not archived");
        return None;
    }
    match tokio::fs::write(&path, body).await {
        Ok(()) => Some(path),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Report archive write failed");
            None
        }
    }
}
