//! Filing staged receipts into the archive.

mod ids;
mod staging;

pub use ids::{ReceiptIdSource, SequentialIds, UuidIds};
pub use staging::{scan_staging, StagedReceipt, StagingBatch};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::archive::{ArchiveLayout, ReceiptPaths, RecordWriter};
use crate::error::{ArchiveError, ImportError, Result};
use crate::models::config::GrocerConfig;
use crate::models::receipt::{ImportSummary, ImportedReceipt, ItemTally};
use crate::receipt::{receipt_lines, LineParser};

/// Moves receipt pairs from the inbox into the dated archive.
///
/// Assumes it is the only writer to the archive while it runs.
pub struct ReceiptImporter<G = UuidIds> {
    inbox: PathBuf,
    layout: ArchiveLayout,
    parser: LineParser,
    ids: G,
}

impl ReceiptImporter<UuidIds> {
    pub fn new(inbox: impl Into<PathBuf>, archive_root: impl Into<PathBuf>) -> Self {
        Self {
            inbox: inbox.into(),
            layout: ArchiveLayout::new(archive_root),
            parser: LineParser::new(),
            ids: UuidIds,
        }
    }

    pub fn from_config(config: &GrocerConfig) -> Self {
        Self::new(&config.paths.inbox, &config.paths.database)
            .with_parser(LineParser::from_config(&config.parser))
    }
}

impl<G: ReceiptIdSource> ReceiptImporter<G> {
    pub fn with_parser(mut self, parser: LineParser) -> Self {
        self.parser = parser;
        self
    }

    /// Swap the identifier source.
    pub fn with_id_source<H: ReceiptIdSource>(self, ids: H) -> ReceiptImporter<H> {
        ReceiptImporter {
            inbox: self.inbox,
            layout: self.layout,
            parser: self.parser,
            ids,
        }
    }

    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    /// Pair up what is waiting in the inbox.
    pub fn scan(&self) -> Result<StagingBatch> {
        Ok(scan_staging(&self.inbox)?)
    }

    /// Import every complete pair in the inbox, filed under `date`.
    ///
    /// Stops at the first receipt that fails; receipts imported before it
    /// stay imported.
    pub fn import_all(&mut self, date: NaiveDate) -> Result<ImportSummary> {
        let batch = self.scan()?;
        let mut summary = ImportSummary {
            skipped: batch
                .unpaired
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            ..Default::default()
        };

        for staged in &batch.receipts {
            summary.imported.push(self.import_receipt(staged, date)?);
        }

        info!("Imported {} receipts", summary.receipt_count());
        Ok(summary)
    }

    /// Import one pair: write its record, then move both files next to it.
    ///
    /// On failure everything done for this receipt is undone before the
    /// error is returned.
    pub fn import_receipt(
        &mut self,
        staged: &StagedReceipt,
        date: NaiveDate,
    ) -> Result<ImportedReceipt> {
        let id = self.ids.next_id();
        let paths = self.layout.receipt_paths(date, &id);

        if paths.record.exists() {
            return Err(ImportError::IdInUse {
                id,
                directory: paths.directory,
            }
            .into());
        }

        fs::create_dir_all(&paths.directory).map_err(|source| ImportError::CreateDir {
            path: paths.directory.clone(),
            source,
        })?;

        let text = fs::read_to_string(&staged.text).map_err(|source| ImportError::ReadText {
            path: staged.text.clone(),
            source,
        })?;

        let tally = match self.write_record(&text, &paths.record) {
            Ok(tally) => tally,
            Err(source) => {
                discard(&paths.record);
                return Err(ImportError::WriteRecord {
                    path: paths.record,
                    source,
                }
                .into());
            }
        };

        self.file_sources(staged, &paths)?;

        info!(
            "Imported {} items with total price {} as {}",
            tally.item_count, tally.total, id
        );

        Ok(ImportedReceipt {
            id,
            basename: staged.basename.clone(),
            directory: paths.directory,
            item_count: tally.item_count,
            unpriced_count: tally.unpriced_count,
            total: tally.total,
        })
    }

    fn write_record(&self, text: &str, path: &Path) -> std::result::Result<ItemTally, ArchiveError> {
        let mut writer = RecordWriter::create(path)?;
        let mut tally = ItemTally::default();

        for item in self.parser.parse_items(receipt_lines(text)) {
            tally.add(&item)?;
            writer.write_item(&item)?;
        }

        writer.finish()?;
        Ok(tally)
    }

    /// Move the text and source files into the archive, rolling back on failure.
    fn file_sources(&self, staged: &StagedReceipt, paths: &ReceiptPaths) -> Result<()> {
        if let Err(source) = relocate(&staged.text, &paths.text) {
            discard(&paths.record);
            return Err(ImportError::Relocate {
                from: staged.text.clone(),
                to: paths.text.clone(),
                source,
            }
            .into());
        }

        if let Err(source) = relocate(&staged.source, &paths.source) {
            if let Err(e) = relocate(&paths.text, &staged.text) {
                error!(
                    "Failed to move {} back to {}: {}",
                    paths.text.display(),
                    staged.text.display(),
                    e
                );
            }
            discard(&paths.record);
            return Err(ImportError::Relocate {
                from: staged.source.clone(),
                to: paths.source.clone(),
                source,
            }
            .into());
        }

        Ok(())
    }
}

/// Move a file, falling back to copy and delete across filesystems.
///
/// On failure the file is left only at `from`.
fn relocate(from: &Path, to: &Path) -> io::Result<()> {
    debug!("Move {} to {}", from.display(), to.display());
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if to.is_dir() {
                return Err(rename_err);
            }
            fs::copy(from, to)?;
            if let Err(remove_err) = fs::remove_file(from) {
                if let Err(e) = fs::remove_file(to) {
                    error!("Failed to remove copy {}: {}", to.display(), e);
                }
                return Err(remove_err);
            }
            Ok(())
        }
    }
}

/// Remove a partially imported record, logging if that fails too.
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            error!("Failed to remove partial record {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::read_records;
    use crate::report::aggregate_archive;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::error::GrocerError;
    use crate::models::receipt::ParsedItem;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        inbox: PathBuf,
        database: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let inbox = dir.path().join("Inbox");
            let database = dir.path().join("Database");
            fs::create_dir_all(&inbox).unwrap();
            fs::create_dir_all(&database).unwrap();
            Self {
                _dir: dir,
                inbox,
                database,
            }
        }

        fn stage(&self, basename: &str, text: &str) {
            fs::write(self.inbox.join(format!("{basename}.txt")), text).unwrap();
            fs::write(self.inbox.join(format!("{basename}.pdf")), b"%PDF-1.4").unwrap();
        }

        fn importer(&self) -> ReceiptImporter<SequentialIds> {
            ReceiptImporter::new(&self.inbox, &self.database)
                .with_id_source(SequentialIds::new("r"))
        }

        fn inbox_files(&self) -> Vec<String> {
            let mut names: Vec<_> = fs::read_dir(&self.inbox)
                .unwrap()
                .map(|e| e.unwrap().file_name().into_string().unwrap())
                .collect();
            names.sort();
            names
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_import_single_receipt() {
        let fx = Fixture::new();
        fx.stage("a", "MILK 2.50\nBREAD 1-99\nEGGS T\n");

        let summary = fx.importer().import_all(date()).unwrap();

        assert_eq!(summary.receipt_count(), 1);
        let receipt = &summary.imported[0];
        assert_eq!(receipt.id, "r-1");
        assert_eq!(receipt.basename, "a");
        assert_eq!(receipt.item_count, 3);
        assert_eq!(receipt.unpriced_count, 1);
        assert_eq!(receipt.total, dec("4.49"));

        let day = fx.database.join("2024/05/17");
        assert_eq!(receipt.directory, day);
        assert_eq!(
            fs::read_to_string(day.join("r-1.tsv")).unwrap(),
            "MILK\t2.50\nBREAD\t1.99\nEGGS\tNaN\n"
        );
        assert_eq!(
            fs::read_to_string(day.join("r-1.txt")).unwrap(),
            "MILK 2.50\nBREAD 1-99\nEGGS T\n"
        );
        assert!(day.join("r-1.pdf").is_file());
        assert!(fx.inbox_files().is_empty());

        assert_eq!(
            read_records(&day.join("r-1.tsv")).unwrap(),
            vec![
                ParsedItem::priced("MILK", dec("2.50")),
                ParsedItem::priced("BREAD", dec("1.99")),
                ParsedItem::unpriced("EGGS"),
            ]
        );
    }

    #[test]
    fn test_unpaired_text_is_left_in_inbox() {
        let fx = Fixture::new();
        fx.stage("good", "APPLES 3.00\n");
        fs::write(fx.inbox.join("lonely.txt"), "MILK 2.50\n").unwrap();

        let summary = fx.importer().import_all(date()).unwrap();

        assert_eq!(summary.receipt_count(), 1);
        assert_eq!(summary.imported[0].basename, "good");
        assert_eq!(
            summary.skipped,
            vec![fx.inbox.join("lonely.txt").display().to_string()]
        );
        assert_eq!(fx.inbox_files(), vec!["lonely.txt".to_string()]);
    }

    #[test]
    fn test_each_receipt_gets_its_own_id() {
        let fx = Fixture::new();
        fx.stage("a", "MILK 2.50\n");
        fx.stage("b", "BREAD 1.99\n");

        let summary = fx.importer().import_all(date()).unwrap();
        let ids: Vec<_> = summary.imported.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r-1", "r-2"]);

        let day = fx.database.join("2024/05/17");
        for id in ids {
            for ext in ["txt", "tsv", "pdf"] {
                assert!(day.join(format!("{id}.{ext}")).is_file());
            }
        }
    }

    #[test]
    fn test_conflicting_extensions_import_nothing() {
        let fx = Fixture::new();
        fx.stage("a", "MILK 2.50\n");
        fs::write(fx.inbox.join("a.TXT"), "BREAD 1.99\n").unwrap();

        let err = fx.importer().import_all(date()).unwrap_err();
        assert!(matches!(
            err,
            GrocerError::Import(ImportError::ExtensionConflict { .. })
        ));
        assert_eq!(fx.inbox_files().len(), 3);
        assert!(!fx.database.join("2024").exists());
    }

    #[test]
    fn test_failed_move_rolls_back_receipt() {
        let fx = Fixture::new();
        fx.stage("a", "MILK 2.50\n");

        // occupy the destination of the pdf so the second move fails
        let day = fx.database.join("2024/05/17");
        fs::create_dir_all(day.join("r-1.pdf")).unwrap();

        let err = fx.importer().import_all(date()).unwrap_err();
        assert!(matches!(
            err,
            GrocerError::Import(ImportError::Relocate { .. })
        ));

        assert_eq!(fx.inbox_files(), vec!["a.pdf".to_string(), "a.txt".to_string()]);
        assert!(!day.join("r-1.tsv").exists());
        assert!(!day.join("r-1.txt").exists());
    }

    #[test]
    fn test_reused_id_is_rejected() {
        let fx = Fixture::new();
        fx.stage("a", "MILK 2.50\n");
        let day = fx.database.join("2024/05/17");
        fs::create_dir_all(&day).unwrap();
        fs::write(day.join("r-1.tsv"), "OLD\t1.00\n").unwrap();

        let err = fx.importer().import_all(date()).unwrap_err();
        assert!(matches!(
            err,
            GrocerError::Import(ImportError::IdInUse { .. })
        ));
        assert_eq!(fs::read_to_string(day.join("r-1.tsv")).unwrap(), "OLD\t1.00\n");
        assert_eq!(fx.inbox_files().len(), 2);
    }

    #[test]
    fn test_carriage_return_lines_read_back() {
        let fx = Fixture::new();
        fx.stage("a", "MILK 2.50\rBREAD 1.99\r\nORGANIC MILK 1.00\n");

        let summary = fx.importer().import_all(date()).unwrap();
        assert_eq!(summary.imported[0].item_count, 3);

        let stats = aggregate_archive(fx.importer().layout(), StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(stats["MILK"].total_cost, dec("3.50"));
        assert_eq!(stats["MILK"].occurrence_count, 2);
        assert_eq!(stats["BREAD"].total_cost, dec("1.99"));
    }

    #[test]
    fn test_overflowing_receipt_is_not_filed() {
        let fx = Fixture::new();
        // the largest price with two decimals; a hundred and one of them overflow
        let line = "GOLD 792281625142643375935439503.35\n";
        fx.stage("a", &line.repeat(101));

        let err = fx.importer().import_all(date()).unwrap_err();
        assert!(matches!(
            err,
            GrocerError::Import(ImportError::WriteRecord {
                source: ArchiveError::Overflow(_),
                ..
            })
        ));
        assert_eq!(fx.inbox_files(), vec!["a.pdf".to_string(), "a.txt".to_string()]);
        assert!(!fx.database.join("2024/05/17/r-1.tsv").exists());
    }

    #[test]
    fn test_unreadable_text_names_the_file() {
        let fx = Fixture::new();
        fx.stage("a", "MILK 2.50\n");
        fs::write(fx.inbox.join("a.txt"), [0xff, 0xfe, 0x00]).unwrap();

        let err = fx.importer().import_all(date()).unwrap_err();
        match err {
            GrocerError::Import(ImportError::ReadText { path, .. }) => {
                assert_eq!(path, fx.inbox.join("a.txt"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_fallback_leaves_no_stray_copy() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let from = locked.join("a.pdf");
        fs::write(&from, b"%PDF-1.4").unwrap();
        let to = dir.path().join("r-1.pdf");

        // a read-only directory refuses both the rename and the removal
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
        let result = relocate(&from, &to);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if result.is_ok() {
            // permissions are not enforced for this user
            return;
        }
        assert!(from.is_file());
        assert!(!to.exists());
    }

    #[test]
    fn test_reimport_after_success_finds_nothing() {
        let fx = Fixture::new();
        fx.stage("a", "MILK 2.50\n");

        let mut importer = fx.importer();
        assert_eq!(importer.import_all(date()).unwrap().receipt_count(), 1);
        assert_eq!(importer.import_all(date()).unwrap().receipt_count(), 0);
    }
}
