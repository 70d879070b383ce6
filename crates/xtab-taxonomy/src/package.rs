#![deny(unsafe_code)]

//! Taxonomy packages: a directory with a sha256-pinned `manifest.toml`, one
//! taxonomy index and any number of table definition files.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use xtab_model::TableDefinition;

use crate::error::TaxonomyError;
use crate::hash::sha256_hex;
use crate::index::TaxonomyIndex;
use crate::manifest::{Manifest, ManifestFile, PackageInfo};

pub const MANIFEST_FILE: &str = "manifest.toml";
pub const MANIFEST_SCHEMA: &str = "xtab.taxonomy-package";

const ROLE_TAXONOMY_INDEX: &str = "taxonomy_index";
const ROLE_TABLE: &str = "table";
const SINGLE_ROLES: &[&str] = &[ROLE_TAXONOMY_INDEX];
const ALLOWED_ROLES: &[&str] = &[ROLE_TAXONOMY_INDEX, ROLE_TABLE];
const ALLOWED_KINDS: &[&str] = &["json", "other"];

#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifySummary {
    pub package_dir: PathBuf,
    pub package: PackageInfo,
    pub file_count: usize,
    pub concept_count: usize,
    pub base_set_count: usize,
    pub drs_count: usize,
    pub table_count: usize,
}

#[derive(Debug, Clone)]
pub struct TaxonomyPackage {
    pub manifest: Manifest,
    pub files: Vec<ManifestFile>,
    pub index: TaxonomyIndex,
    pub tables: Vec<TableDefinition>,
}

impl TaxonomyPackage {
    pub fn verify_and_load(package_dir: &Path) -> Result<(Self, VerifySummary), TaxonomyError> {
        let manifest = load_manifest(&package_dir.join(MANIFEST_FILE))?;

        validate_manifest(&manifest)?;

        let mut files = manifest.files.clone();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        for file in &files {
            verify_file(package_dir, file)?;
        }

        let index_path = resolve_role_path(package_dir, &files, ROLE_TAXONOMY_INDEX)?;
        let index: TaxonomyIndex = read_json(&index_path)?;

        let mut tables: Vec<TableDefinition> = Vec::new();
        let mut seen_ids: BTreeSet<String> = BTreeSet::new();
        for file in files.iter().filter(|f| f.role == ROLE_TABLE) {
            let path = package_dir.join(&file.path);
            let table: TableDefinition = read_json(&path)?;
            if !seen_ids.insert(table.id.clone()) {
                return Err(TaxonomyError::DuplicateTable { id: table.id, path });
            }
            debug!(table = %table.id, path = %path.display(), "loaded table definition");
            tables.push(table);
        }

        let summary = VerifySummary {
            package_dir: package_dir.to_path_buf(),
            package: manifest.package.clone(),
            file_count: files.len(),
            concept_count: index.concept_count(),
            base_set_count: index.base_set_count(),
            drs_count: index.drs_count(),
            table_count: tables.len(),
        };
        info!(
            package = %summary.package.name,
            files = summary.file_count,
            tables = summary.table_count,
            "taxonomy package verified"
        );

        Ok((
            Self {
                manifest,
                files,
                index,
                tables,
            },
            summary,
        ))
    }

    pub fn table(&self, id: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|table| table.id == id)
    }
}

fn load_manifest(path: &Path) -> Result<Manifest, TaxonomyError> {
    let contents = std::fs::read_to_string(path).map_err(|e| TaxonomyError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| TaxonomyError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, TaxonomyError> {
    let contents = std::fs::read_to_string(path).map_err(|e| TaxonomyError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| TaxonomyError::json(path, e))
}

fn validate_manifest(manifest: &Manifest) -> Result<(), TaxonomyError> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(TaxonomyError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != 1 {
        return Err(TaxonomyError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }

    let mut single_roles: BTreeSet<&str> = BTreeSet::new();
    let mut paths: BTreeSet<PathBuf> = BTreeSet::new();

    for file in &manifest.files {
        let role = file.role.as_str();
        if !ALLOWED_ROLES.contains(&role) {
            return Err(TaxonomyError::InvalidManifest {
                message: format!("unsupported role '{}' for {}", file.role, file.path),
            });
        }
        if SINGLE_ROLES.contains(&role) && !single_roles.insert(role) {
            return Err(TaxonomyError::DuplicateRole {
                role: file.role.clone(),
            });
        }

        if !ALLOWED_KINDS.contains(&file.kind.as_str()) {
            return Err(TaxonomyError::InvalidManifest {
                message: format!("unsupported kind '{}' for {}", file.kind, file.path),
            });
        }

        validate_sha(&file.sha256, &file.path)?;

        let path = normalize_path(&validate_path(&file.path)?);
        if !paths.insert(path) {
            return Err(TaxonomyError::InvalidManifest {
                message: format!("file listed twice: {}", file.path),
            });
        }
    }

    for role in SINGLE_ROLES {
        if !single_roles.contains(role) {
            return Err(TaxonomyError::MissingRole {
                role: role.to_string(),
            });
        }
    }

    Ok(())
}

fn verify_file(package_dir: &Path, file: &ManifestFile) -> Result<(), TaxonomyError> {
    let full_path = package_dir.join(&file.path);
    let bytes = std::fs::read(&full_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TaxonomyError::MissingFile {
                path: full_path.clone(),
            }
        } else {
            TaxonomyError::io(full_path.clone(), e)
        }
    })?;

    let actual = sha256_hex(&bytes);
    let expected = file.sha256.to_ascii_lowercase();
    if actual != expected {
        return Err(TaxonomyError::Sha256Mismatch {
            path: full_path,
            expected,
            actual,
        });
    }
    Ok(())
}

fn resolve_role_path(
    package_dir: &Path,
    files: &[ManifestFile],
    role: &str,
) -> Result<PathBuf, TaxonomyError> {
    let f = files
        .iter()
        .find(|f| f.role == role)
        .ok_or_else(|| TaxonomyError::MissingRole {
            role: role.to_string(),
        })?;
    Ok(package_dir.join(&f.path))
}

fn validate_sha(sha: &str, path: &str) -> Result<(), TaxonomyError> {
    if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(TaxonomyError::InvalidSha256 {
            path: PathBuf::from(path),
            message: "sha256 must be 64 hex characters".to_string(),
        });
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<PathBuf, TaxonomyError> {
    if path.contains('\\') {
        return Err(TaxonomyError::InvalidPath {
            path: PathBuf::from(path),
            message: "manifest path must use '/' separators".to_string(),
        });
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return Err(TaxonomyError::InvalidPath {
            path: p,
            message: "manifest path must be relative".to_string(),
        });
    }

    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(TaxonomyError::InvalidPath {
            path: p,
            message: "manifest path must not traverse out of the package".to_string(),
        });
    }

    Ok(p)
}

fn normalize_path(p: &Path) -> PathBuf {
    p.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
