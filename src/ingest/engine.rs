use std::collections::HashSet;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::database::models::{Image, NewImage};
use crate::database::repo::{Catalog, CatalogStore};
use crate::error::{Result, VaultError};
use crate::ingest::classifier::classify;
use crate::ingest::fingerprint::{FileFingerprinter, FingerprintError, Fingerprinter, Probe};
use crate::ingest::scanner::{iter_image_files, THUMB_DIRNAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Delete catalog rows whose files were not seen during the walk.
    pub cleanup: bool,
    /// Tag every seen image with its folder names.
    pub auto_tag: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            cleanup: false,
            auto_tag: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub added: u64,
    pub updated: u64,
    pub unchanged: u64,
    /// Rows deleted by cleanup.
    pub removed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Added,
    Updated,
    Unchanged,
}

/// Walks a vault and reconciles it with the catalog.
///
/// Callers must not run two scans against the same catalog at once.
pub struct Scanner<F = FileFingerprinter> {
    fingerprinter: F,
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            fingerprinter: FileFingerprinter,
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Fingerprinter> Scanner<F> {
    pub fn with_fingerprinter(fingerprinter: F) -> Self {
        Self { fingerprinter }
    }

    pub fn fingerprinter(&self) -> &F {
        &self.fingerprinter
    }

    pub fn scan(
        &self,
        catalog: &mut Catalog,
        root: &Path,
        options: ScanOptions,
    ) -> Result<ScanStats> {
        self.scan_with_progress(catalog, root, options, |_| {})
    }

    /// Like [`Scanner::scan`], calling `progress` once per enumerated file.
    ///
    /// All catalog changes of one call commit in a single transaction; any
    /// catalog error rolls the whole scan back.
    pub fn scan_with_progress(
        &self,
        catalog: &mut Catalog,
        root: &Path,
        options: ScanOptions,
        mut progress: impl FnMut(&Path),
    ) -> Result<ScanStats> {
        let root = validate_root(root)?;
        fs::create_dir_all(root.join(THUMB_DIRNAME))?;
        info!(
            "Scanning {:?} (cleanup: {}, auto_tag: {})",
            root, options.cleanup, options.auto_tag
        );

        let tx = catalog.transaction()?;
        let stats = self.scan_store(&*tx, &root, options, &mut progress)?;
        tx.commit()?;

        info!(
            "Scan finished: {} added, {} updated, {} unchanged, {} removed",
            stats.added, stats.updated, stats.unchanged, stats.removed
        );
        Ok(stats)
    }

    /// The walk itself, against any store. `root` must already be canonical.
    pub fn scan_store<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        root: &Path,
        options: ScanOptions,
        progress: &mut dyn FnMut(&Path),
    ) -> Result<ScanStats> {
        let mut stats = ScanStats::default();
        let mut seen: HashSet<String> = HashSet::new();

        for file in iter_image_files(root) {
            progress(&file);
            let Some(outcome) = self.process_file(store, root, &file, &mut seen, options)? else {
                continue;
            };
            match outcome {
                FileOutcome::Added => stats.added += 1,
                FileOutcome::Updated => stats.updated += 1,
                FileOutcome::Unchanged => stats.unchanged += 1,
            }
        }

        if options.cleanup {
            for image in store.all_images()? {
                if !seen.contains(&image.path) {
                    debug!("Removing vanished {:?}", image.path);
                    store.delete_image(&image)?;
                    stats.removed += 1;
                }
            }
        }

        Ok(stats)
    }

    /// `None` when the file disappeared or could not be stat'ed after enumeration.
    fn process_file<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        root: &Path,
        file: &Path,
        seen: &mut HashSet<String>,
        options: ScanOptions,
    ) -> Result<Option<FileOutcome>> {
        let resolved = file
            .canonicalize()
            .and_then(|p| fs::metadata(&p).map(|m| (p, m)));
        let (path, metadata) = match resolved {
            Ok(found) => found,
            Err(e) => {
                warn!("Skipping {:?}: {}", file, e);
                return Ok(None);
            }
        };
        let key = path.to_string_lossy().into_owned();
        seen.insert(key.clone());

        let size = metadata.len();
        let mtime = mtime_secs(&metadata);

        let (image, outcome) = match store.find_image_by_path(&key)? {
            None => {
                let (width, height) = self.probe_dimensions(&path).or((0, 0));
                let file_hash = self.probe_hash(&path).measured();
                let image = store.upsert_image(&NewImage {
                    filename: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    dirpath: path
                        .parent()
                        .map(|p| p.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    path: key,
                    size,
                    width,
                    height,
                    mtime,
                    file_hash,
                })?;
                (image, FileOutcome::Added)
            }
            Some(existing) if existing.size != size || existing.mtime != mtime => {
                let (width, height) = self
                    .probe_dimensions(&path)
                    .or((existing.width, existing.height));
                let file_hash = self.probe_hash(&path).measured();
                let image = store.upsert_image(&NewImage {
                    path: existing.path,
                    filename: existing.filename,
                    dirpath: existing.dirpath,
                    size,
                    width,
                    height,
                    mtime,
                    file_hash,
                })?;
                (image, FileOutcome::Updated)
            }
            Some(existing) => (existing, FileOutcome::Unchanged),
        };

        if options.auto_tag {
            apply_folder_tags(store, &image, &path, root)?;
        }

        Ok(Some(outcome))
    }

    fn probe_dimensions(&self, path: &Path) -> Probe<(u32, u32)> {
        degrade(self.fingerprinter.dimensions(path), path, "dimensions")
    }

    fn probe_hash(&self, path: &Path) -> Probe<String> {
        degrade(self.fingerprinter.hash(path), path, "hash")
    }
}

/// Drops the failure detail after logging it.
fn degrade<T>(
    result: std::result::Result<T, FingerprintError>,
    path: &Path,
    what: &str,
) -> Probe<T> {
    match result {
        Ok(value) => Probe::Measured(value),
        Err(e) => {
            warn!("Could not read {} of {:?}: {}", what, path, e);
            Probe::Degraded
        }
    }
}

fn apply_folder_tags<S: CatalogStore + ?Sized>(
    store: &S,
    image: &Image,
    path: &Path,
    root: &Path,
) -> Result<()> {
    for name in classify(path, root) {
        let tag = store.find_or_create_tag(&name)?;
        if !store.link_exists(image.id, tag.id)? {
            store.create_link(image.id, tag.id)?;
        }
    }
    Ok(())
}

fn validate_root(root: &Path) -> Result<PathBuf> {
    if !root.is_dir() {
        return Err(VaultError::InvalidRoot(root.to_path_buf()));
    }
    root.canonicalize().map_err(|_| VaultError::InvalidRoot(root.to_path_buf()))
}

fn mtime_secs(metadata: &Metadata) -> f64 {
    match metadata.modified() {
        Ok(time) => match time.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs_f64(),
            Err(e) => -e.duration().as_secs_f64(),
        },
        Err(_) => 0.0,
    }
}
