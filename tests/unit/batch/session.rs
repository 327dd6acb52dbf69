use std::io::{Cursor, Read};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use image::{Rgba, RgbaImage};

use super::*;
use crate::export::archive::InMemoryArchive;
use crate::foundation::error::StickerErrorKind;

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(w, h, Rgba([20, 120, 220, 255]));
    ImageRsCodec.encode(&img, OutputFormat::Png, 1.0).unwrap()
}

fn config() -> StickerConfig {
    StickerConfig {
        target_size: 24,
        threads: Some(3),
        ..StickerConfig::default()
    }
}

fn src(name: &str) -> SourceImage {
    SourceImage::new(name, "image/png", png(12, 6))
}

fn prefixed() -> BatchOpts {
    BatchOpts::default()
}

fn keep_original() -> BatchOpts {
    BatchOpts {
        add_outline: false,
        naming: NamingPolicy::KeepOriginal,
    }
}

fn names_of(session: &StickerSession) -> Vec<&str> {
    session.stickers().iter().map(|s| s.assigned_name()).collect()
}

#[test]
fn failing_file_does_not_stop_siblings() {
    let mut session = StickerSession::new(config()).unwrap();
    let files = vec![
        src("f1.png"),
        SourceImage::new("f2.bmp", "image/bmp", png(4, 4)),
        src("f3.png"),
        src("f4.png"),
        src("f5.png"),
    ];
    let report = session.process_batch(files, &prefixed()).unwrap();

    assert_eq!(report.submitted, 5);
    assert_eq!(report.succeeded, 4);
    assert_eq!(report.failed, 1);
    assert!(!report.cancelled);
    assert_eq!(
        names_of(&session),
        ["001_f1.png", "002_f3.png", "003_f4.png", "004_f5.png"]
    );
    assert_eq!(
        session.status().find("f2.bmp").and_then(FileStatus::error_kind),
        Some(StickerErrorKind::UnsupportedMediaType)
    );
    assert!(session.status().is_settled());
}

#[test]
fn non_image_selections_are_skipped() {
    let mut session = StickerSession::new(config()).unwrap();
    let files = vec![
        SourceImage::new("notes.txt", "text/plain", b"hello".to_vec()),
        src("a.png"),
    ];
    let report = session.process_batch(files, &prefixed()).unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.succeeded, 1);
    assert!(matches!(
        session.status().find("notes.txt"),
        Some(FileStatus::Skipped { .. })
    ));
    assert_eq!(names_of(&session), ["001_a.png"]);
}

#[test]
fn done_status_reports_name_and_policy() {
    let mut session = StickerSession::new(config()).unwrap();
    session
        .process_batch(vec![src("My Cat!.png")], &prefixed())
        .unwrap();
    let status = session.status().find("My Cat!.png").unwrap();
    assert_eq!(status.to_string(), "done: 001_My_Cat.png (prefixed name)");
}

#[test]
fn keep_original_suffixes_duplicates() {
    let mut session = StickerSession::new(config()).unwrap();
    let files = vec![src("cat.png"), src("cat.png"), src("cat.jpg")];
    session.process_batch(files, &keep_original()).unwrap();

    assert_eq!(names_of(&session), ["cat.png", "cat_1.png", "cat_2.png"]);
    assert_eq!(session.names().len(), 3);
}

#[test]
fn results_commit_in_selection_order() {
    let mut session = StickerSession::new(StickerConfig {
        sort_by_name: false,
        ..config()
    })
    .unwrap();
    let files: Vec<_> = ["z", "y", "x", "w", "v", "u"]
        .iter()
        .map(|n| src(&format!("{n}.png")))
        .collect();
    session.process_batch(files, &prefixed()).unwrap();

    assert_eq!(
        names_of(&session),
        [
            "001_z.png",
            "002_y.png",
            "003_x.png",
            "004_w.png",
            "005_v.png",
            "006_u.png"
        ]
    );
}

#[test]
fn oversize_stickers_are_kept_and_counted() {
    let mut session = StickerSession::new(StickerConfig {
        max_file_bytes: 8,
        ..config()
    })
    .unwrap();
    let report = session.process_batch(vec![src("big.png")], &prefixed()).unwrap();
    assert_eq!(report.oversize, 1);
    assert!(session.stickers()[0].is_oversize());
}

#[test]
fn reprocessing_replaces_the_batch() {
    let mut session = StickerSession::new(config()).unwrap();
    session
        .process_batch(vec![src("a.png"), src("b.png")], &prefixed())
        .unwrap();
    let first_gen = session.generation_handle().current();

    let report = session.process_batch(vec![src("c.png")], &prefixed()).unwrap();
    assert!(report.generation > first_gen);
    assert_eq!(names_of(&session), ["001_c.png"]);
    assert_eq!(session.status().len(), 1);
    assert!(!session.names().contains("001_a.png"));
}

/// Advances the session generation while decoding the `advance_at`-th file.
struct Invalidating {
    handle: Arc<OnceLock<BatchGeneration>>,
    advance_at: usize,
    decoded: AtomicUsize,
}

impl Invalidating {
    fn new(handle: &Arc<OnceLock<BatchGeneration>>, advance_at: usize) -> Self {
        Self {
            handle: Arc::clone(handle),
            advance_at,
            decoded: AtomicUsize::new(0),
        }
    }
}

impl ImageCodec for Invalidating {
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<RgbaImage> {
        let n = self.decoded.fetch_add(1, Ordering::SeqCst);
        if n == self.advance_at
            && let Some(handle) = self.handle.get()
        {
            if n > 0 {
                // Let the earlier results reach the collector first.
                std::thread::sleep(Duration::from_millis(100));
            }
            handle.advance();
        }
        ImageRsCodec.decode(bytes)
    }

    fn encode(&self, raster: &RgbaImage, format: OutputFormat, q: f32) -> anyhow::Result<Vec<u8>> {
        ImageRsCodec.encode(raster, format, q)
    }
}

fn assert_discarded(session: &StickerSession, report: &BatchReport) {
    assert!(report.cancelled);
    assert_eq!(report.succeeded, 0);
    assert!(session.stickers().is_empty());
    assert!(session.names().is_empty());
    assert!(session.status().is_settled());
    assert!(
        session
            .status()
            .iter()
            .all(|(_, e)| e.status.to_string() == "skipped: batch invalidated")
    );
}

#[test]
fn invalidated_batch_drops_late_results() {
    let handle = Arc::new(OnceLock::new());
    let codec = Arc::new(Invalidating::new(&handle, 0));
    let mut session = StickerSession::with_codec(config(), codec).unwrap();
    handle.set(session.generation_handle()).unwrap();

    let report = session
        .process_batch(vec![src("a.png"), src("b.png")], &prefixed())
        .unwrap();
    assert_discarded(&session, &report);
}

#[test]
fn invalidation_after_a_commit_discards_the_whole_batch() {
    let handle = Arc::new(OnceLock::new());
    let codec = Arc::new(Invalidating::new(&handle, 1));
    let mut session = StickerSession::with_codec(
        StickerConfig {
            threads: Some(1),
            ..config()
        },
        codec,
    )
    .unwrap();
    handle.set(session.generation_handle()).unwrap();

    let report = session
        .process_batch(vec![src("a.png"), src("b.png"), src("c.png")], &prefixed())
        .unwrap();
    assert_discarded(&session, &report);
    assert!(!session.names().contains("001_a.png"));
    assert!(session.export_zip(OutputFormat::Png).is_err());

    // The next batch starts from a clean slate.
    let report = session.process_batch(vec![src("d.png")], &prefixed()).unwrap();
    assert!(!report.cancelled);
    assert_eq!(names_of(&session), ["001_d.png"]);
}

fn renamed_session() -> (StickerSession, StickerId, StickerId) {
    let mut session = StickerSession::new(config()).unwrap();
    session
        .process_batch(vec![src("a.png"), src("b.png")], &keep_original())
        .unwrap();
    let a = session.stickers()[0].id().clone();
    let b = session.stickers()[1].id().clone();
    (session, a, b)
}

#[test]
fn rename_sanitizes_and_allows_webp() {
    let (mut session, a, _) = renamed_session();
    let outcome = session.rename(&a, "  dog house!.webp ").unwrap();
    assert_eq!(
        outcome,
        RenameOutcome::Renamed {
            from: "a.png".to_string(),
            to: "dog_house.webp".to_string()
        }
    );
    assert_eq!(session.sticker(&a).unwrap().assigned_name(), "dog_house.webp");
    assert_eq!(session.sticker(&a).unwrap().original_name(), "a.png");
    assert!(!session.names().contains("a.png"));
    assert_eq!(session.names().len(), 2);
}

#[test]
fn rename_to_current_name_is_unchanged() {
    let (mut session, a, _) = renamed_session();
    assert_eq!(
        session.rename(&a, "a.png").unwrap(),
        RenameOutcome::Unchanged {
            name: "a.png".to_string()
        }
    );
    assert!(session.names().contains("a.png"));
    assert_eq!(session.names().len(), 2);
}

#[test]
fn rename_onto_a_taken_name_gets_a_suffix() {
    let (mut session, a, _) = renamed_session();
    let outcome = session.rename(&a, "b.png").unwrap();
    assert!(matches!(outcome, RenameOutcome::Renamed { ref to, .. } if to == "b_1.png"));
    assert_eq!(names_of(&session), ["b.png", "b_1.png"]);
}

#[test]
fn rename_resolving_back_to_the_current_name_is_unchanged() {
    let (mut session, a, _) = renamed_session();
    session.rename(&a, "b.png").unwrap();
    assert_eq!(session.sticker(&a).unwrap().assigned_name(), "b_1.png");

    assert_eq!(
        session.rename(&a, "b.png").unwrap(),
        RenameOutcome::Unchanged {
            name: "b_1.png".to_string()
        }
    );
    assert!(session.names().contains("b_1.png"));
    assert_eq!(session.names().len(), 2);
}

#[test]
fn invalid_rename_changes_nothing() {
    let (mut session, a, _) = renamed_session();
    for bad in ["", "   ", ".png", "dog.gif", "dog", "???.png"] {
        let outcome = session.rename(&a, bad).unwrap();
        assert!(
            matches!(outcome, RenameOutcome::Rejected { ref kept, .. } if kept == "a.png"),
            "{bad:?}"
        );
    }
    assert_eq!(names_of(&session), ["a.png", "b.png"]);
    assert_eq!(session.names().len(), 2);
}

#[test]
fn rename_of_unknown_id_fails() {
    let (mut session, a, _) = renamed_session();
    session.reset();
    let err = session.rename(&a, "x.png").unwrap_err();
    assert_eq!(err.kind(), StickerErrorKind::Validation);
}

#[test]
fn zip_export_contains_assigned_names() {
    let mut session = StickerSession::new(config()).unwrap();
    session
        .process_batch(
            vec![src("one.png"), src("two.png"), src("three.png")],
            &prefixed(),
        )
        .unwrap();
    let build = session.export_zip(OutputFormat::Png).unwrap();
    assert_eq!(build.file_name, "TelegramStickers_png.zip");

    let mut zip = zip::ZipArchive::new(Cursor::new(build.bytes)).unwrap();
    assert_eq!(zip.len(), 3);
    for sticker in session.stickers() {
        let path = format!("TelegramStickers/{}", sticker.assigned_name());
        let mut content = Vec::new();
        zip.by_name(&path).unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content.as_slice(), sticker.image().bytes());
    }
}

#[test]
fn webp_export_uses_webp_entries() {
    let (session, _, _) = renamed_session();
    let mut w = InMemoryArchive::new();
    let build = session
        .build_archive_with(OutputFormat::Webp, &mut w)
        .unwrap();
    assert_eq!(build.entries, ["a.webp", "b.webp"]);
    assert_eq!(
        w.paths(),
        ["TelegramStickers/a.webp", "TelegramStickers/b.webp"]
    );
}

struct BrokenWriter;

impl ArchiveWriter for BrokenWriter {
    fn add_file(&mut self, _: &str, _: &[u8]) -> StickerResult<()> {
        Err(StickerError::archive("disk full"))
    }

    fn serialize(&mut self) -> StickerResult<Vec<u8>> {
        Err(StickerError::archive("disk full"))
    }
}

#[test]
fn failed_export_leaves_the_batch_intact() {
    let (session, _, _) = renamed_session();
    let err = session
        .build_archive_with(OutputFormat::Png, &mut BrokenWriter)
        .unwrap_err();
    assert_eq!(err.kind(), StickerErrorKind::Archive);
    assert_eq!(names_of(&session), ["a.png", "b.png"]);
    assert_eq!(session.names().len(), 2);
}

#[test]
fn empty_batch_cannot_be_exported() {
    let session = StickerSession::new(config()).unwrap();
    assert_eq!(
        session.export_zip(OutputFormat::Png).unwrap_err().kind(),
        StickerErrorKind::Validation
    );
}

#[test]
fn invalid_config_is_rejected() {
    let err = StickerSession::new(StickerConfig {
        threads: Some(0),
        ..StickerConfig::default()
    })
    .err()
    .unwrap();
    assert_eq!(err.kind(), StickerErrorKind::Config);
}
