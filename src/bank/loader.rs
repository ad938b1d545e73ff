use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::bank::{BankError, QuestionBank};

const FALLBACK_BANK: &str = include_str!("../../assets/questions/fallback.json");

pub const BANK_FILE_NAME: &str = "questions.json";

/// Where the bank should come from, in priority order: explicit path, URL,
/// `questions.json` in the data directory, then the bundled sample.
#[derive(Clone, Debug, Default)]
pub struct BankRequest {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    pub data_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BankSource {
    File(PathBuf),
    Url(String),
    Fallback,
}

/// Something the user should be told about after loading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BankNotice {
    /// Every configured source failed; the bundled sample is in use.
    FellBack { reason: String },
    /// Some entries in the loaded document were invalid and dropped.
    Skipped { count: usize },
}

#[derive(Debug)]
pub struct LoadedBank {
    pub bank: QuestionBank,
    pub source: BankSource,
    pub notices: Vec<BankNotice>,
}

/// Load the question bank. Never fails: any read, fetch, or parse problem is
/// reported as a notice and the bundled sample is used instead.
pub fn load(request: &BankRequest) -> LoadedBank {
    let mut last_error: Option<BankError> = None;

    if let Some(ref path) = request.path {
        match load_file(path) {
            Ok(loaded) => return loaded,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "question bank file unusable");
                last_error = Some(e);
            }
        }
    }

    if let Some(ref url) = request.url {
        match load_url(url) {
            Ok(loaded) => return loaded,
            Err(e) => {
                warn!(%url, error = %e, "question bank download unusable");
                last_error = Some(e);
            }
        }
    }

    // The data-dir copy is optional, so a missing file is not worth a notice.
    if let Some(ref dir) = request.data_dir {
        let path = dir.join(BANK_FILE_NAME);
        if path.exists() {
            match load_file(&path) {
                Ok(loaded) => return loaded,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "question bank file unusable");
                    last_error = Some(e);
                }
            }
        }
    }

    let mut notices = Vec::new();
    match last_error {
        Some(e) => notices.push(BankNotice::FellBack {
            reason: e.to_string(),
        }),
        None => info!("no question bank configured, using bundled sample"),
    }

    LoadedBank {
        bank: fallback(),
        source: BankSource::Fallback,
        notices,
    }
}

/// The bundled sample bank.
pub fn fallback() -> QuestionBank {
    QuestionBank::from_json(FALLBACK_BANK)
        .map(|parsed| parsed.bank)
        .unwrap_or_default()
}

fn load_file(path: &Path) -> Result<LoadedBank, BankError> {
    let content = fs::read_to_string(path).map_err(|source| BankError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = parse(&content, BankSource::File(path.to_path_buf()))?;
    info!(path = %path.display(), questions = loaded.bank.len(), "loaded question bank");
    Ok(loaded)
}

fn load_url(url: &str) -> Result<LoadedBank, BankError> {
    let content = fetch_url(url).ok_or_else(|| BankError::Fetch(url.to_string()))?;
    let loaded = parse(&content, BankSource::Url(url.to_string()))?;
    info!(%url, questions = loaded.bank.len(), "downloaded question bank");
    Ok(loaded)
}

fn parse(content: &str, source: BankSource) -> Result<LoadedBank, BankError> {
    let parsed = QuestionBank::from_json(content)?;
    let mut notices = Vec::new();
    if parsed.skipped > 0 {
        warn!(skipped = parsed.skipped, "dropped invalid question entries");
        notices.push(BankNotice::Skipped {
            count: parsed.skipped,
        });
    }
    Ok(LoadedBank {
        bank: parsed.bank,
        source,
        notices,
    })
}

#[cfg(feature = "network")]
fn fetch_url(url: &str) -> Option<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .ok()?;
    let response = client.get(url).send().ok()?;
    if response.status().is_success() {
        response.text().ok()
    } else {
        None
    }
}

#[cfg(not(feature = "network"))]
fn fetch_url(_url: &str) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bundled_fallback_is_valid() {
        let bank = fallback();
        assert!(!bank.is_empty());
        for q in bank.questions() {
            assert!(!q.correct_text().is_empty());
        }
    }

    #[test]
    fn test_no_sources_uses_fallback_quietly() {
        let loaded = load(&BankRequest::default());
        assert_eq!(loaded.source, BankSource::Fallback);
        assert!(loaded.notices.is_empty());
        assert_eq!(loaded.bank.len(), fallback().len());
    }

    #[test]
    fn test_missing_file_falls_back_with_notice() {
        let dir = TempDir::new().unwrap();
        let request = BankRequest {
            path: Some(dir.path().join("nope.json")),
            ..Default::default()
        };
        let loaded = load(&request);
        assert_eq!(loaded.source, BankSource::Fallback);
        assert!(matches!(loaded.notices[0], BankNotice::FellBack { .. }));
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.json");
        fs::write(&path, "const questions = [").unwrap();
        let loaded = load(&BankRequest {
            path: Some(path),
            ..Default::default()
        });
        assert_eq!(loaded.source, BankSource::Fallback);
        assert_eq!(loaded.notices.len(), 1);
    }

    #[test]
    fn test_file_with_some_invalid_entries_reports_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.json");
        fs::write(
            &path,
            r#"[{"id": 3, "question": "q", "options": ["a","b","c","d"], "correctAnswer": "C"},
                {"id": 4, "question": "q", "options": ["a"], "correctAnswer": "C"}]"#,
        )
        .unwrap();
        let loaded = load(&BankRequest {
            path: Some(path.clone()),
            ..Default::default()
        });
        assert_eq!(loaded.source, BankSource::File(path));
        assert_eq!(loaded.bank.len(), 1);
        assert_eq!(loaded.notices, vec![BankNotice::Skipped { count: 1 }]);
    }

    #[test]
    fn test_data_dir_copy_is_used() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(BANK_FILE_NAME),
            r#"[{"id": 9, "question": "q", "options": ["a","b","c","d"], "correctAnswer": "A"}]"#,
        )
        .unwrap();
        let loaded = load(&BankRequest {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        });
        assert!(matches!(loaded.source, BankSource::File(_)));
        assert!(loaded.bank.contains(9));
    }
}
