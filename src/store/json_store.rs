use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::config::Config;
use crate::store::StoragePort;
use crate::store::schema::{AttemptHistoryData, EXPORT_VERSION, ExportData, LedgerData};

const LEDGER_FILE: &str = "ledger.json";
const ATTEMPTS_FILE: &str = "attempts.json";
const DATA_FILES: [&str; 2] = [LEDGER_FILE, ATTEMPTS_FILE];

/// `<data_dir>/examsim`, or `./examsim` when the platform has no data dir.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("examsim")
}

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(file = name, error = %e, "unreadable data file, starting fresh");
                T::default()
            }),
            Err(e) => {
                warn!(file = name, error = %e, "failed to read data file");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Bundle both data files and the config into one export document.
    pub fn export_all(&self, config: &Config) -> ExportData {
        ExportData {
            examsim_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            ledger: self.load_ledger(),
            attempts: self.load_attempts(),
        }
    }

    /// Transactional import: two-phase commit with best-effort .bak rollback.
    ///
    /// Stage phase: write all data to .tmp files. If any fails, clean up and bail.
    /// Commit phase: for each file, rename original to .bak, then .tmp to final.
    /// On commit failure, attempt to restore .bak files and clean up .tmp files.
    /// After success, delete .bak files.
    pub fn import_all(&self, data: &ExportData) -> Result<()> {
        if data.examsim_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.examsim_export_version,
                EXPORT_VERSION
            );
        }

        let files: Vec<(&str, String)> = vec![
            (LEDGER_FILE, serde_json::to_string_pretty(&data.ledger)?),
            (ATTEMPTS_FILE, serde_json::to_string_pretty(&data.attempts)?),
        ];

        let mut staged: Vec<PathBuf> = Vec::new();
        for (name, json) in &files {
            let tmp_path = self.file_path(name).with_extension("json.tmp");
            match write_synced(&tmp_path, json) {
                Ok(()) => staged.push(tmp_path),
                Err(e) => {
                    for tmp in &staged {
                        let _ = fs::remove_file(tmp);
                    }
                    bail!("Import failed during staging: {e}");
                }
            }
        }

        // (final_path, bak_path, had_original) so rollback can restore absence
        let mut committed: Vec<(PathBuf, PathBuf, bool)> = Vec::new();
        for (i, (name, _)) in files.iter().enumerate() {
            let final_path = self.file_path(name);
            let bak_path = final_path.with_extension("json.bak");
            let tmp_path = &staged[i];
            let had_original = final_path.exists();

            if had_original && let Err(e) = fs::rename(&final_path, &bak_path) {
                rollback(&committed);
                for tmp in &staged {
                    let _ = fs::remove_file(tmp);
                }
                bail!("Import failed during commit (backup): {e}");
            }

            if let Err(e) = fs::rename(tmp_path, &final_path) {
                if had_original && bak_path.exists() {
                    let _ = fs::rename(&bak_path, &final_path);
                } else {
                    let _ = fs::remove_file(&final_path);
                }
                rollback(&committed);
                for tmp in &staged[i + 1..] {
                    let _ = fs::remove_file(tmp);
                }
                bail!("Import failed during commit (rename): {e}");
            }

            committed.push((final_path, bak_path, had_original));
        }

        for (_, bak_path, had_original) in &committed {
            if *had_original {
                let _ = fs::remove_file(bak_path);
            }
        }

        Ok(())
    }

    /// Check for leftover .bak files from an interrupted import.
    /// Returns true if recovery files were found (and cleaned up).
    pub fn check_interrupted_import(&self) -> bool {
        let mut found = false;
        for name in DATA_FILES {
            let bak_path = self.file_path(name).with_extension("json.bak");
            if bak_path.exists() {
                found = true;
                let _ = fs::remove_file(&bak_path);
            }
        }
        found
    }
}

fn write_synced(path: &Path, contents: &str) -> Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn rollback(committed: &[(PathBuf, PathBuf, bool)]) {
    for (final_path, bak_path, had_original) in committed {
        if *had_original {
            let _ = fs::rename(bak_path, final_path);
        } else {
            let _ = fs::remove_file(final_path);
        }
    }
}

impl StoragePort for JsonStore {
    fn load_ledger(&self) -> LedgerData {
        let data: LedgerData = self.load(LEDGER_FILE);
        if data.needs_reset() {
            warn!(version = data.schema_version, "ledger schema changed, starting fresh");
            return LedgerData::default();
        }
        data
    }

    fn save_ledger(&self, data: &LedgerData) -> Result<()> {
        self.save(LEDGER_FILE, data)
    }

    fn load_attempts(&self) -> AttemptHistoryData {
        let data: AttemptHistoryData = self.load(ATTEMPTS_FILE);
        if data.needs_reset() {
            warn!(version = data.schema_version, "attempt history schema changed, starting fresh");
            return AttemptHistoryData::default();
        }
        data
    }

    fn save_attempts(&self, data: &AttemptHistoryData) -> Result<()> {
        self.save(ATTEMPTS_FILE, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ledger::HistoryLedger;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn make_test_export(config: &Config) -> ExportData {
        ExportData {
            examsim_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            ledger: LedgerData::default(),
            attempts: AttemptHistoryData::default(),
        }
    }

    fn sample_ledger() -> LedgerData {
        let mut ledger = HistoryLedger::default();
        ledger.record_answer(3, false);
        ledger.record_answer(8, true);
        ledger.note_exam_started();
        LedgerData::new(ledger)
    }

    #[test]
    fn test_missing_files_load_as_empty() {
        let (_dir, store) = make_test_store();
        assert!(store.load_ledger().ledger.is_empty());
        assert!(store.load_attempts().attempts.is_empty());
    }

    #[test]
    fn test_ledger_save_and_reload() {
        let (_dir, store) = make_test_store();
        let data = sample_ledger();
        store.save_ledger(&data).unwrap();
        assert_eq!(store.load_ledger(), data);
        assert!(!store.file_path("ledger.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_loads_as_empty() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(LEDGER_FILE), "{not json").unwrap();
        assert_eq!(store.load_ledger(), LedgerData::default());
    }

    #[test]
    fn test_stale_schema_is_reset() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.file_path(ATTEMPTS_FILE),
            r#"{"schema_version": 0, "attempts": []}"#,
        )
        .unwrap();
        assert!(!store.load_attempts().needs_reset());
    }

    #[test]
    fn test_round_trip_export_import() {
        let (_dir, store) = make_test_store();
        let config = Config::default();
        store.save_ledger(&sample_ledger()).unwrap();

        let export = store.export_all(&config);
        assert_eq!(export.examsim_export_version, EXPORT_VERSION);

        let (_dir2, store2) = make_test_store();
        store2.import_all(&export).unwrap();

        let imported = store2.load_ledger();
        assert_eq!(imported, export.ledger);
        assert_eq!(imported.ledger.exam_attempts, 1);
    }

    #[test]
    fn test_version_rejection() {
        let (_dir, store) = make_test_store();
        let config = Config::default();
        let mut export = make_test_export(&config);
        export.examsim_export_version = 99;

        let result = store.import_all(&export);
        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Unsupported export version"));
        assert!(err_msg.contains("99"));
    }

    #[test]
    fn test_import_staging_failure_preserves_originals() {
        let (dir, store) = make_test_store();

        store.save_ledger(&sample_ledger()).unwrap();
        let original_content = fs::read_to_string(store.file_path(LEDGER_FILE)).unwrap();

        // Staging into a directory that does not exist must fail.
        let bad_dir = dir.path().join("nonexistent_subdir");
        let bad_store = JsonStore {
            base_dir: bad_dir.clone(),
        };
        let export = make_test_export(&Config::default());
        let result = bad_store.import_all(&export);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Import failed during staging")
        );

        let after_content = fs::read_to_string(store.file_path(LEDGER_FILE)).unwrap();
        assert_eq!(original_content, after_content);
        assert!(!bad_dir.exists());

        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }

    #[test]
    fn test_import_replaces_existing_files() {
        let (_dir, store) = make_test_store();
        store.save_ledger(&sample_ledger()).unwrap();

        store
            .import_all(&make_test_export(&Config::default()))
            .unwrap();

        assert!(store.load_ledger().ledger.is_empty());
        assert!(store.file_path(ATTEMPTS_FILE).exists());
        assert!(!store.file_path("ledger.json.bak").exists());
    }

    #[test]
    fn test_check_interrupted_import_detects_bak_files() {
        let (_dir, store) = make_test_store();

        assert!(!store.check_interrupted_import());

        fs::write(store.file_path("ledger.json.bak"), "{}").unwrap();
        assert!(store.check_interrupted_import());
        assert!(!store.file_path("ledger.json.bak").exists());
    }
}
