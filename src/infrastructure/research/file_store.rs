use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::domain::research::{
    sanitize_component, CampaignStore, CampaignSummary, CompanySummary,
};
use crate::domain::DomainError;

/// Campaign artifacts on the local filesystem under a root directory
#[derive(Debug, Clone)]
pub struct FileCampaignStore {
    root: PathBuf,
}

impl FileCampaignStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn storage_error(action: &str, path: &Path, err: std::io::Error) -> DomainError {
    DomainError::storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// Upper bound on `_N` suffixes tried for one file name
const MAX_NAME_SUFFIX: usize = 1000;

/// `research_x.json` -> `research_x_2.json`
fn suffixed_name(file_name: &str, n: usize) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, n, ext),
        _ => format!("{}_{}", file_name, n),
    }
}

/// Write `contents` to a file in `dir` that did not exist before. Events in
/// the same second share a timestamped name, so later ones get a `_N` suffix.
async fn write_new_file(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf, DomainError> {
    for n in 1..=MAX_NAME_SUFFIX {
        let name = if n == 1 {
            file_name.to_string()
        } else {
            suffixed_name(file_name, n)
        };
        let path = dir.join(name);

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(storage_error("create", &path, e)),
        };

        file.write_all(contents.as_bytes())
            .await
            .map_err(|e| storage_error("write", &path, e))?;
        file.flush()
            .await
            .map_err(|e| storage_error("write", &path, e))?;
        return Ok(path);
    }

    Err(DomainError::storage(format!(
        "No free file name for {} in {}",
        file_name,
        dir.display()
    )))
}

/// Sorted names of the subdirectories of `dir`
async fn subdirectories(dir: &Path) -> Result<Vec<(String, PathBuf)>, DomainError> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| storage_error("read", dir, e))?;
    let mut dirs = Vec::new();

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| storage_error("read", dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| storage_error("inspect", &entry.path(), e))?;
        if file_type.is_dir() {
            dirs.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
    }

    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}

async fn count_files(dir: &Path) -> Result<usize, DomainError> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| storage_error("read", dir, e))?;
    let mut count = 0;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| storage_error("read", dir, e))?
    {
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if is_file {
            count += 1;
        }
    }

    Ok(count)
}

#[async_trait]
impl CampaignStore for FileCampaignStore {
    async fn save(
        &self,
        campaign: &str,
        company: &str,
        file_name: &str,
        contents: &str,
    ) -> Result<String, DomainError> {
        let dir = self
            .root
            .join(sanitize_component(campaign))
            .join(sanitize_component(company));

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_error("create", &dir, e))?;

        let path = write_new_file(&dir, &sanitize_component(file_name), contents).await?;

        info!(path = %path.display(), bytes = contents.len(), "Saved campaign artifact");
        Ok(path.display().to_string())
    }

    async fn list_campaigns(&self) -> Result<Vec<CampaignSummary>, DomainError> {
        if !fs::try_exists(&self.root).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut campaigns = Vec::new();
        for (name, path) in subdirectories(&self.root).await? {
            let mut companies = Vec::new();
            for (company, company_path) in subdirectories(&path).await? {
                companies.push(CompanySummary {
                    name: company,
                    file_count: count_files(&company_path).await?,
                });
            }
            campaigns.push(CampaignSummary { name, companies });
        }

        Ok(campaigns)
    }
}
