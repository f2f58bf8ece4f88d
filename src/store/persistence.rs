//! File-backed store
//!
//! Every node lives in its own file under a single root directory (schema
//! modules share one file per module). Reads and writes go through tokio fs;
//! bulk operations fan out with a bounded number of in-flight files.

use super::cache::IdPathCache;
use super::listing::list_files;
use super::{DeleteOptions, NodeStore, WriteOptions, WriteSummary};
use crate::codec::note::note_relative_path;
use crate::codec::{NodeCodec, NoteCodec, SchemaCodec};
use crate::config::{NotetreeConfig, StoreConfig};
use crate::error::{DecodeError, StorageError};
use crate::tree::{build_tree, NodeTree};
use crate::types::{NodeId, NodeKind, RawNodeRecord, ROOT_NAME};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-file failure collected during a bulk read
enum FileFailure {
    Io(StorageError),
    Malformed(String),
}

/// Node visited by a write
struct Visit {
    id: NodeId,
    relative_path: PathBuf,
    root: bool,
}

/// File-backed node store
pub struct FileStore {
    root: PathBuf,
    note_codec: Arc<dyn NodeCodec>,
    schema_codec: Arc<dyn NodeCodec>,
    config: StoreConfig,
    max_depth: usize,
    cache: RwLock<IdPathCache>,
    root_id: RwLock<NodeId>,
}

impl FileStore {
    /// Store with the default codecs and settings
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_codecs(
            root,
            Arc::new(NoteCodec::default()),
            Arc::new(SchemaCodec::new()),
            StoreConfig::default(),
            1,
        )
    }

    /// Store for the vault described by `config`; a relative vault root
    /// resolves against `base`
    pub fn from_config(config: &NotetreeConfig, base: &Path) -> Self {
        Self::with_codecs(
            config.vault.resolve_root(base),
            Arc::new(NoteCodec::new(config.store.write_hierarchy)),
            Arc::new(SchemaCodec::new()),
            config.store.clone(),
            config.vault.max_depth,
        )
    }

    pub fn with_codecs(
        root: impl Into<PathBuf>,
        note_codec: Arc<dyn NodeCodec>,
        schema_codec: Arc<dyn NodeCodec>,
        config: StoreConfig,
        max_depth: usize,
    ) -> Self {
        Self {
            root: root.into(),
            note_codec,
            schema_codec,
            config,
            max_depth: max_depth.max(1),
            cache: RwLock::new(IdPathCache::new()),
            root_id: RwLock::new(ROOT_NAME.to_string()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn codec(&self, kind: NodeKind) -> &Arc<dyn NodeCodec> {
        match kind {
            NodeKind::Note => &self.note_codec,
            NodeKind::Schema => &self.schema_codec,
        }
    }

    /// Whether `id` names the root note: the `root` sentinel or the tracked root id
    pub fn is_root(&self, id: &str) -> bool {
        id == ROOT_NAME || *self.root_id.read() == id
    }

    /// Id of the current root note
    pub fn root_id(&self) -> NodeId {
        self.root_id.read().clone()
    }

    /// Read the root note
    pub async fn get_root(&self) -> Result<RawNodeRecord, StorageError> {
        let id = self.root_id();
        self.get(&id).await
    }

    /// Cached path of a note, relative to the store root
    pub fn cached_path(&self, id: &str) -> Option<PathBuf> {
        self.cache.read().get(id).map(Path::to_path_buf)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.read().len()
    }

    fn limit(&self) -> usize {
        self.config.max_concurrent_io.max(1)
    }

    async fn list(&self, codec: &dyn NodeCodec) -> Result<Vec<PathBuf>, StorageError> {
        let root = self.root.clone();
        let suffix = codec.suffix();
        let max_depth = self.max_depth;
        tokio::task::spawn_blocking(move || list_files(&root, suffix, max_depth))
            .await
            .map_err(|e| StorageError::Io {
                path: self.root.clone(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e),
            })?
    }
}

async fn decode_file(codec: &dyn NodeCodec, path: &Path) -> Result<Vec<RawNodeRecord>, FileFailure> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FileFailure::Io(StorageError::from_io(path, e)))?;
    match codec.decode(path, &text) {
        Ok(records) => Ok(records),
        Err(DecodeError::MissingHeader) => {
            warn!(path = %path.display(), "No front matter, reading file as plain text");
            Ok(codec.decode_without_header(path, &text))
        }
        Err(DecodeError::Malformed(message)) => Err(FileFailure::Malformed(message)),
    }
}

async fn write_file(path: &Path, text: String) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::from_io(parent, e))?;
    }
    tokio::fs::write(path, text)
        .await
        .map_err(|e| StorageError::from_io(path, e))
}

#[async_trait]
impl NodeStore for FileStore {
    async fn get(&self, id: &str) -> Result<RawNodeRecord, StorageError> {
        let relative = self
            .cached_path(id)
            .or_else(|| self.is_root(id).then(|| note_relative_path(ROOT_NAME)))
            .ok_or_else(|| StorageError::NotFound(format!("note '{id}'")))?;
        let path = self.root.join(relative);

        let mut records = match decode_file(self.note_codec.as_ref(), &path).await {
            Ok(records) => records,
            Err(FileFailure::Io(e)) => return Err(e),
            Err(FileFailure::Malformed(message)) => {
                warn!(path = %path.display(), error = %message, "Malformed front matter");
                return Err(StorageError::BadParse { paths: vec![path] });
            }
        };
        records
            .pop()
            .ok_or_else(|| StorageError::NotFound(format!("note '{id}'")))
    }

    async fn query_all(&self, kind: NodeKind) -> Result<NodeTree, StorageError> {
        let codec = Arc::clone(self.codec(kind));
        let paths = self.list(codec.as_ref()).await?;
        let file_count = paths.len();

        let mut results: Vec<(PathBuf, Result<Vec<RawNodeRecord>, FileFailure>)> =
            stream::iter(paths)
                .map(|path| {
                    let codec = Arc::clone(&codec);
                    async move {
                        let outcome = decode_file(codec.as_ref(), &path).await;
                        (path, outcome)
                    }
                })
                .buffer_unordered(self.limit())
                .collect()
                .await;
        results.sort_by(|a, b| a.0.cmp(&b.0));

        let mut records = Vec::new();
        let mut located = HashMap::new();
        let mut bad_paths = Vec::new();
        for (path, outcome) in results {
            match outcome {
                Ok(decoded) => {
                    let relative = path.strip_prefix(&self.root).unwrap_or(path.as_path());
                    for record in &decoded {
                        located.insert(record.id.clone(), relative.to_path_buf());
                    }
                    records.extend(decoded);
                }
                Err(FileFailure::Io(e)) => return Err(e),
                Err(FileFailure::Malformed(message)) => {
                    warn!(path = %path.display(), error = %message, "Malformed header");
                    bad_paths.push(path);
                }
            }
        }
        if !bad_paths.is_empty() {
            return Err(StorageError::BadParse { paths: bad_paths });
        }

        let tree = build_tree(kind, records)?;
        if kind == NodeKind::Note {
            self.cache
                .write()
                .refresh_from_tree(&tree, codec.as_ref(), &located);
            *self.root_id.write() = tree.root_id().to_string();
        }
        info!(
            kind = %kind,
            files = file_count,
            nodes = tree.len(),
            root = %self.root.display(),
            "Query complete"
        );
        Ok(tree)
    }

    async fn write(
        &self,
        tree: &NodeTree,
        id: &str,
        options: WriteOptions,
    ) -> Result<WriteSummary, StorageError> {
        let codec = Arc::clone(self.codec(tree.kind()));
        let start = tree
            .get(id)
            .ok_or_else(|| StorageError::NotFound(format!("{} '{id}'", tree.kind())))?;

        let mut visits = Vec::new();
        let mut skipped = Vec::new();
        let mut jobs: BTreeMap<PathBuf, String> = BTreeMap::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            // notes already on disk are rewritten where they were found
            let relative_path = match tree.kind() {
                NodeKind::Note => self.cached_path(&node.id),
                NodeKind::Schema => None,
            }
            .unwrap_or_else(|| codec.relative_path(tree, node));
            if options.persists(node.is_stub) {
                if !jobs.contains_key(&relative_path) {
                    jobs.insert(relative_path.clone(), codec.encode(tree, node)?);
                }
            } else {
                debug!(id = %node.id, "Stub not persisted");
                skipped.push(node.id.clone());
            }
            visits.push(Visit {
                id: node.id.clone(),
                relative_path,
                root: node.is_root(),
            });
            if options.descends() {
                stack.extend(tree.children(&node.id));
            }
        }

        let root = self.root.clone();
        let results: Vec<Result<PathBuf, StorageError>> = stream::iter(jobs)
            .map(|(relative, text)| {
                let path = root.join(&relative);
                async move { write_file(&path, text).await.map(|_| relative) }
            })
            .buffer_unordered(self.limit())
            .collect()
            .await;
        let mut written = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        written.sort();

        if tree.kind() == NodeKind::Note {
            let mut cache = self.cache.write();
            for visit in &visits {
                cache.insert(visit.id.clone(), visit.relative_path.clone());
            }
            if let Some(visit) = visits.iter().find(|v| v.root) {
                *self.root_id.write() = visit.id.clone();
            }
        }

        info!(
            id,
            written = written.len(),
            skipped = skipped.len(),
            "Write complete"
        );
        Ok(WriteSummary { written, skipped })
    }

    async fn delete(&self, id: &str, options: DeleteOptions) -> Result<(), StorageError> {
        if self.is_root(id) {
            return Err(StorageError::IllegalOperation(format!(
                "cannot delete the root note '{id}'"
            )));
        }
        let relative = match options.explicit_path {
            Some(path) => path,
            None => self
                .cached_path(id)
                .ok_or_else(|| StorageError::NotFound(format!("note '{id}'")))?,
        };
        let path = if relative.is_absolute() {
            relative
        } else {
            self.root.join(relative)
        };

        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| StorageError::from_io(&path, e))?;
        self.cache.write().remove(id);
        info!(id, path = %path.display(), "Deleted note");
        Ok(())
    }
}
