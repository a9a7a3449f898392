//! # Batch Driver
//!
//! Renders every selected record, sizes the artifacts for print, and hands
//! them to a sink either one by one or packed onto pages.
//!
//! ## Flow
//!
//! ```text
//! Table ──select──▶ records (table order)
//!                     │  RecordRenderer (per record, own canvas; parallel)
//!                     ▼
//!                artifacts ──resize (Lanczos3)──▶ ordered Vec
//!                     │
//!        ┌────────────┴────────────┐
//!   Individual                   Paged
//!   {prefix}_{id}.png     SheetPacker ──▶ page_001.png …
//! ```
//!
//! A record that fails (for example a missing field) is skipped and reported
//! by default; [`FailurePolicy::Abort`] turns the first failure into an error.
//! A page layout that can never fit an artifact is rejected before anything is
//! rendered.
//!
//! ## Example
//!
//! ```
//! use certmerge::batch::{Batch, BatchConfig};
//! use certmerge::layout::LayoutDocument;
//! use certmerge::render::FontHandle;
//! use certmerge::sink::MemorySink;
//! use certmerge::table::Table;
//! use image::{DynamicImage, Rgba, RgbaImage};
//!
//! let background = DynamicImage::ImageRgba8(RgbaImage::from_pixel(400, 300, Rgba([250, 240, 220, 255])));
//! let table = Table::from_json_str(r#"[{"Name": "Alice"}, {"Name": "Bob"}]"#, "Name").unwrap();
//! let doc: LayoutDocument = serde_json::from_str(r#"{"fields": [{"field": "Name", "size": 40}]}"#).unwrap();
//! let layout = doc.resolve(400, 300);
//! let font = FontHandle::fallback(40.0);
//! let config = BatchConfig::default();
//!
//! let mut sink = MemorySink::new();
//! let report = Batch::new(&background, &table, &layout, &font, &config)
//!     .run(&mut sink)
//!     .unwrap();
//!
//! assert_eq!(report.summary(), "2 succeeded / 0 skipped");
//! assert_eq!(sink.names(), vec!["certificate_Alice.png", "certificate_Bob.png"]);
//! ```

use image::{DynamicImage, RgbaImage, imageops::{self, FilterType}};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::CertmergeError;
use crate::layout::FieldLayout;
use crate::render::{CanvasTemplate, FontHandle, RecordRenderer, RenderedArtifact};
use crate::sheet::{self, SheetConfig};
use crate::sink::{OutputSink, encode_png, safe_name};
use crate::table::{Selected, Table};
use crate::units::{DEFAULT_DPI, Length, PageSize};

/// Smallest and largest preview scale, in percent.
pub const PREVIEW_SCALE_RANGE: (u32, u32) = (20, 200);

/// What each artifact is drawn on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Text over the background image.
    #[default]
    Composited,
    /// Text only, on a transparent canvas (for pre-printed stock).
    Transparent,
}

/// Page geometry for paged output, in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetSettings {
    pub page: PageSize,
    pub margin: Length,
    pub gap: Length,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            page: PageSize::A4,
            margin: Length::cm(1.0),
            gap: Length::mm(5.0),
        }
    }
}

/// How finished artifacts are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum OutputLayout {
    /// One output per record.
    #[default]
    Individual,
    /// Artifacts packed onto print pages.
    Paged(SheetSettings),
}

/// What to do when one record cannot be rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the record and carry on with the rest.
    #[default]
    SkipAndContinue,
    /// Fail the whole batch on the first bad record.
    Abort,
}

/// Batch settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub output_mode: OutputMode,
    pub output_layout: OutputLayout,
    /// Physical (width, height) of each artifact. `None` keeps the
    /// background's pixel size.
    pub artifact_size: Option<(Length, Length)>,
    pub dpi: u32,
    pub failure_policy: FailurePolicy,
    /// Individual outputs are named `{prefix}_{id}.png`.
    pub name_prefix: String,
    /// Render records on the rayon thread pool.
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output_mode: OutputMode::Composited,
            output_layout: OutputLayout::Individual,
            artifact_size: None,
            dpi: DEFAULT_DPI,
            failure_policy: FailurePolicy::SkipAndContinue,
            name_prefix: "certificate".to_string(),
            parallel: true,
        }
    }
}

/// Shared flag for stopping a batch between records.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Records finished so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

/// A record or output that did not make it, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub id: String,
    pub reason: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Records selected for rendering.
    pub total: usize,
    /// Identifiers rendered successfully, in output order.
    pub succeeded: Vec<String>,
    /// Records that failed to render.
    pub skipped: Vec<Skipped>,
    /// Names handed to the sink.
    pub emitted: Vec<String>,
    /// Outputs that failed to encode or store, by output name.
    pub failed_outputs: Vec<Skipped>,
    /// Pages produced (paged layout only).
    pub pages: usize,
}

impl BatchReport {
    pub fn summary(&self) -> String {
        format!(
            "{} succeeded / {} skipped",
            self.succeeded.len(),
            self.skipped.len()
        )
    }
}

enum Outcome {
    Rendered(RenderedArtifact),
    Failed(String, CertmergeError),
    /// Not attempted: cancelled, or stopped after an earlier failure.
    NotRun,
}

/// One batch run over a table.
pub struct Batch<'a> {
    background: &'a DynamicImage,
    table: &'a Table,
    layout: &'a [FieldLayout],
    font: &'a FontHandle,
    config: &'a BatchConfig,
    selection: Vec<String>,
    cancel: CancelToken,
    progress: Option<Box<dyn Fn(Progress) + Sync + 'a>>,
}

impl<'a> Batch<'a> {
    pub fn new(
        background: &'a DynamicImage,
        table: &'a Table,
        layout: &'a [FieldLayout],
        font: &'a FontHandle,
        config: &'a BatchConfig,
    ) -> Self {
        Self {
            background,
            table,
            layout,
            font,
            config,
            selection: Vec::new(),
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    /// Only render records with these identifiers. Empty means all.
    pub fn select(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.selection = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Stop between records once `token` is cancelled.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Called after each record finishes, possibly from worker threads.
    pub fn on_progress(mut self, callback: impl Fn(Progress) + Sync + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    fn template(&self) -> CanvasTemplate {
        match self.config.output_mode {
            OutputMode::Composited => CanvasTemplate::composited(self.background),
            OutputMode::Transparent => {
                CanvasTemplate::transparent(self.background.width(), self.background.height())
            }
        }
    }

    /// Pixel size every artifact is resized to.
    fn artifact_pixels(&self) -> Result<(u32, u32), CertmergeError> {
        let (width, height) = match self.config.artifact_size {
            Some((w, h)) => (w.to_pixels(self.config.dpi), h.to_pixels(self.config.dpi)),
            None => (self.background.width(), self.background.height()),
        };
        if width == 0 || height == 0 {
            return Err(CertmergeError::InvalidLength(format!(
                "artifact size {}x{}px at {} DPI is empty",
                width, height, self.config.dpi
            )));
        }
        Ok((width, height))
    }

    fn sheet_config(&self) -> Option<SheetConfig> {
        match self.config.output_layout {
            OutputLayout::Individual => None,
            OutputLayout::Paged(settings) => Some(SheetConfig::from_physical(
                &settings.page,
                settings.margin,
                settings.gap,
                self.config.dpi,
            )),
        }
    }

    /// Render, then emit everything to `sink`.
    pub fn run(&self, sink: &mut dyn OutputSink) -> Result<BatchReport, CertmergeError> {
        let target = self.artifact_pixels()?;
        let sheet = self.sheet_config();
        if let Some(sheet) = &sheet {
            sheet.check_fits(target.0, target.1)?;
        }

        let selected = self.table.select(&self.selection);
        info!(
            "Rendering {} of {} record(s): {:?} output, {}x{}px artifacts, {}",
            selected.len(),
            self.table.len(),
            self.config.output_mode,
            target.0,
            target.1,
            if sheet.is_some() { "paged" } else { "individual" }
        );

        let (artifacts, mut report) = self.render_all(&selected, target)?;

        match sheet {
            None => self.emit_individual(&artifacts, sink, &mut report),
            Some(sheet) => self.emit_pages(&sheet, &artifacts, sink, &mut report)?,
        }

        info!("Batch finished: {}", report.summary());
        Ok(report)
    }

    fn render_all(
        &self,
        selected: &[Selected<'_>],
        target: (u32, u32),
    ) -> Result<(Vec<RenderedArtifact>, BatchReport), CertmergeError> {
        let template = self.template();
        let renderer = RecordRenderer::new(&template, self.layout, self.font);
        let total = selected.len();
        let processed = AtomicUsize::new(0);
        let stop = AtomicBool::new(false);
        let abort = self.config.failure_policy == FailurePolicy::Abort;

        let render_one = |item: &Selected<'_>| -> Outcome {
            if self.cancel.is_cancelled() || stop.load(Ordering::SeqCst) {
                return Outcome::NotRun;
            }

            let outcome = match renderer.render(item.id, item.record) {
                Ok(artifact) => Outcome::Rendered(fit(artifact, target)),
                Err(e) => {
                    if abort {
                        stop.store(true, Ordering::SeqCst);
                    }
                    Outcome::Failed(item.id.to_string(), e)
                }
            };

            let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
            debug!("Rendered {}/{}: {}", done, total, item.id);
            if let Some(callback) = &self.progress {
                callback(Progress {
                    processed: done,
                    total,
                });
            }
            outcome
        };

        let outcomes: Vec<Outcome> = if self.config.parallel {
            selected.par_iter().map(render_one).collect()
        } else {
            selected.iter().map(render_one).collect()
        };

        let interrupted = outcomes.iter().any(|o| matches!(o, Outcome::NotRun));
        if interrupted && self.cancel.is_cancelled() {
            return Err(CertmergeError::Cancelled {
                processed: processed.load(Ordering::SeqCst),
                total,
            });
        }

        let mut report = BatchReport {
            total,
            ..Default::default()
        };
        let mut artifacts = Vec::with_capacity(total);
        for outcome in outcomes {
            match outcome {
                Outcome::Rendered(artifact) => {
                    report.succeeded.push(artifact.id.clone());
                    artifacts.push(artifact);
                }
                Outcome::Failed(_, e) if abort => return Err(e),
                Outcome::Failed(id, e) => {
                    warn!("Skipping record '{}': {}", id, e);
                    report.skipped.push(Skipped {
                        id,
                        reason: e.to_string(),
                    });
                }
                Outcome::NotRun => {}
            }
        }
        Ok((artifacts, report))
    }

    fn emit_individual(
        &self,
        artifacts: &[RenderedArtifact],
        sink: &mut dyn OutputSink,
        report: &mut BatchReport,
    ) {
        for artifact in artifacts {
            let name = format!("{}_{}.png", self.config.name_prefix, safe_name(&artifact.id));
            emit(sink, &name, &artifact.image, report);
        }
    }

    fn emit_pages(
        &self,
        sheet: &SheetConfig,
        artifacts: &[RenderedArtifact],
        sink: &mut dyn OutputSink,
        report: &mut BatchReport,
    ) -> Result<(), CertmergeError> {
        let pages = sheet::pack(sheet, artifacts.iter().map(|a| &a.image))?;
        report.pages = pages.len();
        for page in &pages {
            emit(sink, &page_name(page.number), &page.image, report);
        }
        Ok(())
    }
}

/// Output name of a page.
pub fn page_name(number: usize) -> String {
    format!("page_{:03}.png", number)
}

/// Resize to the print size with a high-quality filter, if it differs.
fn fit(artifact: RenderedArtifact, (width, height): (u32, u32)) -> RenderedArtifact {
    if artifact.image.dimensions() == (width, height) {
        return artifact;
    }
    RenderedArtifact {
        image: imageops::resize(&artifact.image, width, height, FilterType::Lanczos3),
        id: artifact.id,
    }
}

fn emit(sink: &mut dyn OutputSink, name: &str, image: &RgbaImage, report: &mut BatchReport) {
    match encode_png(image).and_then(|png| sink.accept(name, &png)) {
        Ok(()) => report.emitted.push(name.to_string()),
        Err(e) => {
            warn!("Could not emit '{}': {}", name, e);
            report.failed_outputs.push(Skipped {
                id: name.to_string(),
                reason: e.to_string(),
            });
        }
    }
}

/// Render the first selected record for on-screen preview, scaled by
/// `scale_percent` (clamped to 20–200). Returns `None` when nothing is
/// selected. Batch output is always full size.
pub fn preview(
    template: &CanvasTemplate,
    table: &Table,
    selection: &[String],
    layout: &[FieldLayout],
    font: &FontHandle,
    scale_percent: u32,
) -> Result<Option<RgbaImage>, CertmergeError> {
    let Some(first) = table.select(selection).into_iter().next() else {
        return Ok(None);
    };
    let artifact = RecordRenderer::new(template, layout, font).render(first.id, first.record)?;

    let scale = scale_percent.clamp(PREVIEW_SCALE_RANGE.0, PREVIEW_SCALE_RANGE.1);
    if scale == 100 {
        return Ok(Some(artifact.image));
    }
    let (width, height) = template.dimensions();
    let scaled_width = (width * scale / 100).max(1);
    let scaled_height = (height * scale / 100).max(1);
    Ok(Some(imageops::resize(
        &artifact.image,
        scaled_width,
        scaled_height,
        FilterType::Lanczos3,
    )))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutDocument;
    use crate::sink::MemorySink;
    use image::Rgba;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct Fixture {
        background: DynamicImage,
        table: Table,
        layout: Vec<FieldLayout>,
        font: FontHandle,
    }

    fn fixture(rows: &str) -> Fixture {
        let background =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(300, 200, Rgba([230, 230, 250, 255])));
        let table = Table::from_json_str(rows, "Name").unwrap();
        let doc: LayoutDocument = serde_json::from_str(
            r#"{"fields": [{"field": "Name", "size": 30}, {"field": "Course", "size": 20}]}"#,
        )
        .unwrap();
        Fixture {
            layout: doc.resolve(300, 200),
            background,
            table,
            font: FontHandle::fallback(30.0),
        }
    }

    const ROWS: &str = r#"[
        {"Name": "Alice", "Course": "Rust"},
        {"Name": "Bob"},
        {"Name": "Carol/Ng", "Course": "Go"}
    ]"#;

    #[test_log::test]
    fn test_skip_and_continue_reports_bad_rows() {
        let f = fixture(ROWS);
        let config = BatchConfig::default();
        let mut sink = MemorySink::new();
        let report = Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
            .run(&mut sink)
            .unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, vec!["Alice", "Carol/Ng"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id, "Bob");
        assert!(report.skipped[0].reason.contains("Course"));
        assert_eq!(report.summary(), "2 succeeded / 1 skipped");
        assert_eq!(
            sink.names(),
            vec!["certificate_Alice.png", "certificate_Carol_Ng.png"]
        );
    }

    #[test]
    fn test_abort_policy_fails_batch() {
        let f = fixture(ROWS);
        let config = BatchConfig {
            failure_policy: FailurePolicy::Abort,
            parallel: false,
            ..Default::default()
        };
        let mut sink = MemorySink::new();
        let err = Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
            .run(&mut sink)
            .unwrap_err();
        assert!(matches!(err, CertmergeError::MissingField { .. }));
        assert!(sink.outputs.is_empty());
    }

    #[test]
    fn test_selection_follows_table_order() {
        let f = fixture(ROWS);
        let config = BatchConfig::default();
        let mut sink = MemorySink::new();
        let report = Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
            .select(["Carol/Ng", "Alice"])
            .run(&mut sink)
            .unwrap();
        assert_eq!(report.succeeded, vec!["Alice", "Carol/Ng"]);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let f = fixture(ROWS);
        let run = |parallel| {
            let config = BatchConfig {
                parallel,
                ..Default::default()
            };
            let mut sink = MemorySink::new();
            Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
                .run(&mut sink)
                .unwrap();
            sink.outputs
        };
        assert!(run(true) == run(false));
    }

    #[test]
    fn test_artifacts_resized_to_physical_size() {
        let f = fixture(r#"[{"Name": "Alice", "Course": "Rust"}]"#);
        let config = BatchConfig {
            artifact_size: Some((Length::cm(2.54), Length::cm(1.27))),
            dpi: 100,
            ..Default::default()
        };
        let mut sink = MemorySink::new();
        Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
            .run(&mut sink)
            .unwrap();
        let decoded = image::load_from_memory(&sink.outputs[0].1).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 50));
    }

    #[test]
    fn test_paged_output() {
        let rows: Vec<String> = (0..5)
            .map(|i| format!(r#"{{"Name": "P{}", "Course": "C"}}"#, i))
            .collect();
        let f = fixture(&format!("[{}]", rows.join(",")));
        let config = BatchConfig {
            artifact_size: Some((Length::px(300.0), Length::px(400.0))),
            output_layout: OutputLayout::Paged(SheetSettings {
                page: PageSize::parse("900x1200px").unwrap(),
                margin: Length::px(50.0),
                gap: Length::px(10.0),
            }),
            ..Default::default()
        };
        let mut sink = MemorySink::new();
        let report = Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
            .run(&mut sink)
            .unwrap();
        assert_eq!(report.pages, 2);
        assert_eq!(sink.names(), vec!["page_001.png", "page_002.png"]);
    }

    #[test]
    fn test_degenerate_geometry_fails_before_rendering() {
        let f = fixture(ROWS);
        let config = BatchConfig {
            artifact_size: Some((Length::cm(30.0), Length::cm(10.0))),
            output_layout: OutputLayout::Paged(SheetSettings::default()),
            ..Default::default()
        };
        let calls = AtomicUsize::new(0);
        let mut sink = MemorySink::new();
        let err = Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
            .on_progress(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
            .run(&mut sink)
            .unwrap_err();
        assert!(matches!(err, CertmergeError::DegenerateGeometry { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_progress_reaches_total() {
        let f = fixture(ROWS);
        let config = BatchConfig {
            parallel: false,
            ..Default::default()
        };
        let seen = Mutex::new(Vec::new());
        let mut sink = MemorySink::new();
        Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
            .on_progress(|p| seen.lock().unwrap().push((p.processed, p.total)))
            .run(&mut sink)
            .unwrap();
        assert_eq!(seen.into_inner().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_cancel_between_records() {
        let f = fixture(ROWS);
        let config = BatchConfig {
            parallel: false,
            ..Default::default()
        };
        let token = CancelToken::new();
        let trigger = token.clone();
        let mut sink = MemorySink::new();
        let err = Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
            .cancel_token(token)
            .on_progress(move |p| {
                if p.processed == 1 {
                    trigger.cancel();
                }
            })
            .run(&mut sink)
            .unwrap_err();
        match err {
            CertmergeError::Cancelled { processed, total } => assert_eq!((processed, total), (1, 3)),
            other => panic!("expected cancellation, got {other}"),
        }
        assert!(sink.outputs.is_empty());
    }

    #[test]
    fn test_cancel_after_last_record_keeps_batch() {
        let f = fixture(ROWS);
        let config = BatchConfig {
            parallel: false,
            ..Default::default()
        };
        let token = CancelToken::new();
        let trigger = token.clone();
        let mut sink = MemorySink::new();
        let report = Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
            .cancel_token(token)
            .on_progress(move |p| {
                if p.processed == p.total {
                    trigger.cancel();
                }
            })
            .run(&mut sink)
            .unwrap();
        assert_eq!(report.summary(), "2 succeeded / 1 skipped");
        assert_eq!(sink.outputs.len(), 2);
    }

    #[test_log::test]
    fn test_paged_output_with_every_row_skipped_emits_blank_page() {
        let f = fixture(r#"[{"Name": "Bob"}]"#);
        let config = BatchConfig {
            artifact_size: Some((Length::px(300.0), Length::px(400.0))),
            output_layout: OutputLayout::Paged(SheetSettings {
                page: PageSize::parse("900x1200px").unwrap(),
                margin: Length::px(50.0),
                gap: Length::px(10.0),
            }),
            ..Default::default()
        };
        let mut sink = MemorySink::new();
        let report = Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
            .run(&mut sink)
            .unwrap();
        assert_eq!(report.summary(), "0 succeeded / 1 skipped");
        assert_eq!(report.pages, 1);
        assert_eq!(sink.names(), vec!["page_001.png"]);

        let page = image::load_from_memory(&sink.outputs[0].1).unwrap().to_rgba8();
        assert_eq!(page.dimensions(), (900, 1200));
        assert!(page.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    struct FailingSink;

    impl OutputSink for FailingSink {
        fn accept(&mut self, name: &str, _png: &[u8]) -> Result<(), CertmergeError> {
            Err(CertmergeError::Image(format!("disk full writing {}", name)))
        }
    }

    #[test]
    fn test_sink_failures_are_per_output() {
        let f = fixture(r#"[{"Name": "A", "Course": "x"}, {"Name": "B", "Course": "y"}]"#);
        let config = BatchConfig::default();
        let report = Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
            .run(&mut FailingSink)
            .unwrap();
        assert_eq!(report.succeeded.len(), 2);
        assert!(report.emitted.is_empty());
        assert_eq!(report.failed_outputs.len(), 2);
    }

    #[test]
    fn test_transparent_mode_has_clear_background() {
        let f = fixture(r#"[{"Name": "A", "Course": "x"}]"#);
        let config = BatchConfig {
            output_mode: OutputMode::Transparent,
            ..Default::default()
        };
        let mut sink = MemorySink::new();
        Batch::new(&f.background, &f.table, &f.layout, &f.font, &config)
            .run(&mut sink)
            .unwrap();
        let decoded = image::load_from_memory(&sink.outputs[0].1).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_preview_scales() {
        let f = fixture(ROWS);
        let template = CanvasTemplate::composited(&f.background);
        let image = preview(&template, &f.table, &[], &f.layout, &f.font, 50)
            .unwrap()
            .unwrap();
        assert_eq!(image.dimensions(), (150, 100));

        let clamped = preview(&template, &f.table, &[], &f.layout, &f.font, 1000)
            .unwrap()
            .unwrap();
        assert_eq!(clamped.dimensions(), (600, 400));

        let none = preview(&template, &f.table, &["nobody".to_string()], &f.layout, &f.font, 100).unwrap();
        assert!(none.is_none());
    }
}
