//! Highlight engine: one text surface, its issue list, and everything derived
//! from them.
//!
//! The engine owns the current text snapshot and issue list (replaced
//! wholesale on every update), stable ids, request streams, the analysis
//! cache and the layout side (synchronizer, measurer, occlusion, rect cache).
//! All methods are synchronous; the analyzer round trip happens outside and
//! comes back through `complete` / `handle_event`.
//!
//! Update flow:
//! 1. `request_document` / `request_sentence` hand out tickets.
//! 2. `complete` drops stale tickets, turns the response into positioned
//!    issues (synthesis for plain rewrites, offset assignment otherwise),
//!    rebases them across any edit made in the meantime, then replaces or
//!    merges.
//! 3. Positions, sentences and ids are recomputed; the next `on_frame`
//!    remeasures because the issue-set signature changed.

use crate::request::{AnalysisEvent, AnalysisRequest, Completion, SentenceRequest};
use core_config::EffectiveConfig;
use core_diff::{EditScript, rebase_issues, synthesize_issues, with_assigned_offsets};
use core_issues::{
    AnalysisCache, AnalyzerResponse, ApplyError, BulkApplyReport, Issue, IssueId, IssuePosition,
    IssueRegistry, IssueSentenceContext, RequestStreams, SentencePreview, StreamKey, apply_all,
    build_contexts, locate_near, merge_sentence_issues, resolve_positions, sentence_previews,
    text_signature,
};
use core_layout::{
    FrameScheduler, HighlightFrame, LayoutMetrics, LayoutSynchronizer, LayoutTrigger, MeasurePass,
    OcclusionFilter, PassProgress, Rect, RectCache, RectKey, RectMeasurer, ScrollOffset,
    TextSurface, issue_set_signature,
};
use core_text::{SentenceRange, Span, segment_sentences};
use std::sync::Arc;
use tracing::{debug, warn};

/// Turn an analyzer response for `text` into issues positioned in `text`.
pub fn positioned_issues(text: &str, response: AnalyzerResponse) -> Vec<Issue> {
    match response {
        AnalyzerResponse::Rewrite(corrected) => {
            synthesize_issues(&EditScript::compute(text, &corrected))
        }
        AnalyzerResponse::Structured {
            corrected_text,
            issues,
        } => {
            if corrected_text.is_empty() {
                issues
            } else {
                with_assigned_offsets(&EditScript::compute(text, &corrected_text), &issues)
            }
        }
    }
}

pub struct HighlightEngine {
    config: EffectiveConfig,
    scheduler: Arc<dyn FrameScheduler>,
    text: String,
    issues: Vec<Issue>,
    positions: Vec<IssuePosition>,
    ids: Vec<IssueId>,
    sentences: Vec<SentenceRange>,
    registry: IssueRegistry,
    cache: AnalysisCache,
    streams: RequestStreams,
    metrics: Arc<LayoutMetrics>,
    sync: LayoutSynchronizer,
    measurer: RectMeasurer,
    occlusion: OcclusionFilter,
    rects: RectCache,
    pass: Option<MeasurePass>,
    active_sentence: Option<usize>,
    frame_dirty: bool,
    /// Surface revision whose text matched `text` at the last frame.
    seen_revision: Option<u64>,
}

impl HighlightEngine {
    pub fn new(config: EffectiveConfig, scheduler: Arc<dyn FrameScheduler>) -> Self {
        let metrics = Arc::new(LayoutMetrics::default());
        Self {
            sync: LayoutSynchronizer::new(
                scheduler.clone(),
                metrics.clone(),
                config.throttle,
                config.poll_interval,
            ),
            measurer: RectMeasurer::new(metrics.clone(), config.space),
            occlusion: OcclusionFilter::new(
                config.occlusion_ceiling,
                config.occlusion_min_delta_px,
                metrics.clone(),
            ),
            cache: AnalysisCache::new(config.cache_capacity),
            config,
            scheduler,
            text: String::new(),
            issues: Vec::new(),
            positions: Vec::new(),
            ids: Vec::new(),
            sentences: Vec::new(),
            registry: IssueRegistry::new(),
            streams: RequestStreams::new(),
            metrics,
            rects: RectCache::new(),
            pass: None,
            active_sentence: None,
            frame_dirty: true,
            seen_revision: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self.seen_revision = None;
        self.refresh(&[]);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// One id per issue, same order as `issues()`.
    pub fn ids(&self) -> &[IssueId] {
        &self.ids
    }

    pub fn positions(&self) -> &[IssuePosition] {
        &self.positions
    }

    pub fn sentences(&self) -> &[SentenceRange] {
        &self.sentences
    }

    pub fn metrics(&self) -> &Arc<LayoutMetrics> {
        &self.metrics
    }

    pub fn layout_version(&self) -> u64 {
        self.sync.version()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn index_of(&self, id: IssueId) -> Option<usize> {
        self.ids.iter().position(|&i| i == id)
    }

    pub fn issue(&self, id: IssueId) -> Option<&Issue> {
        self.index_of(id).map(|i| &self.issues[i])
    }

    /// Resolved span of an issue in the current snapshot.
    pub fn span_of(&self, id: IssueId) -> Option<Span> {
        let idx = self.index_of(id)?;
        self.positions.iter().find(|p| p.index == idx)?.span
    }

    pub fn contexts(&self) -> Vec<IssueSentenceContext> {
        build_contexts(&self.text, &self.sentences, &self.positions)
    }

    pub fn sentence_of(&self, id: IssueId) -> Option<usize> {
        let idx = self.index_of(id)?;
        self.contexts()
            .into_iter()
            .find(|c| c.issue_index == idx)
            .map(|c| c.sentence_index)
    }

    pub fn previews(&self) -> Vec<SentencePreview> {
        sentence_previews(&self.text, &self.issues, &self.contexts())
    }

    /// Recompute everything derived from `(text, issues)`. `carried[i]` is
    /// the id issue `i` inherits from the previous list, when known.
    fn refresh(&mut self, carried: &[Option<IssueId>]) {
        self.sentences = segment_sentences(&self.text, self.config.segmenter);
        self.positions = resolve_positions(&self.text, &self.issues);
        self.ids = self
            .registry
            .assign_carried(&self.issues, &self.positions, carried);
        if self.active_sentence.is_some_and(|i| i >= self.sentences.len()) {
            self.active_sentence = None;
        }
        self.frame_dirty = true;
        debug!(
            target: "session.engine",
            len = self.text.len(),
            issues = self.issues.len(),
            resolved = self.positions.iter().filter(|p| p.is_resolved()).count(),
            sentences = self.sentences.len(),
            "refresh"
        );
    }

    fn replace_issues(&mut self, issues: Vec<Issue>) {
        self.issues = issues;
        self.refresh(&[]);
    }

    /// Current issues with their resolved spans made explicit, so removing
    /// or rebasing some of them cannot move the others.
    fn pinned_issues(&self) -> Vec<Issue> {
        let mut pinned = self.issues.clone();
        for pos in &self.positions {
            if let Some(span) = pos.span {
                pinned[pos.index] = pinned[pos.index].clone().with_span(span.start, span.end);
            }
        }
        pinned
    }

    /// Move `issues` (snapshot of the current text, one id each) onto `text`.
    /// Ids follow their issues through the rebase. Returns the number of
    /// issues the edit went through.
    fn rebase_onto(&mut self, text: String, issues: Vec<Issue>, ids: Vec<IssueId>) -> usize {
        let report = rebase_issues(&EditScript::compute(&self.text, &text), &issues);
        let carried: Vec<Option<IssueId>> =
            report.origins.iter().map(|&o| ids.get(o).copied()).collect();
        if text != self.text {
            self.text = text;
            self.seen_revision = None;
            // Sentence indices may have shifted.
            self.streams.cancel_sentences();
        }
        self.issues = report.issues;
        self.refresh(&carried);
        report.dropped.len()
    }

    /// Remove the issues at `applied` (indices into the current list) and
    /// adopt `text`, the surface content after their suggestions went in.
    fn retire_applied(&mut self, applied: &[usize], text: String) {
        let (issues, ids): (Vec<Issue>, Vec<IssueId>) = self
            .pinned_issues()
            .into_iter()
            .zip(self.ids.iter().copied())
            .enumerate()
            .filter(|(idx, _)| !applied.contains(idx))
            .map(|(_, pair)| pair)
            .unzip();
        let dropped = self.rebase_onto(text, issues, ids);
        debug!(target: "session.engine", applied = applied.len(), dropped, "issues applied");
    }

    /// Adopt a new text snapshot, rebasing existing issues across the edit.
    /// Returns the number of issues the edit went through (dropped).
    pub fn set_text(&mut self, text: impl Into<String>) -> usize {
        let text = text.into();
        if text == self.text {
            return 0;
        }
        let issues = self.issues.clone();
        let ids = self.ids.clone();
        let dropped = self.rebase_onto(text, issues, ids);
        debug!(target: "session.engine", dropped, "text changed");
        dropped
    }

    pub fn request_document(&mut self) -> AnalysisRequest {
        self.streams.cancel_sentences();
        AnalysisRequest {
            ticket: self.streams.begin(StreamKey::Document),
            text: self.text.clone(),
        }
    }

    /// Re-analysis of one sentence. `None` when the index does not exist.
    pub fn request_sentence(&mut self, index: usize) -> Option<SentenceRequest> {
        let sentence = *self.sentences.get(index)?;
        let core = sentence.core(&self.text).to_string();
        if let Some(cached) = self.cache.get(&core) {
            let fresh = cached.to_vec();
            self.streams.cancel(StreamKey::Sentence(index));
            debug!(target: "session.engine", sentence = index, "sentence cache hit");
            self.merge_sentence(&sentence, &fresh);
            return Some(SentenceRequest::Cached);
        }
        Some(SentenceRequest::Send(AnalysisRequest {
            ticket: self.streams.begin(StreamKey::Sentence(index)),
            text: core,
        }))
    }

    pub fn cancel(&mut self, stream: StreamKey) {
        self.streams.cancel(stream);
    }

    fn merge_sentence(&mut self, sentence: &SentenceRange, fresh: &[Issue]) {
        let merged = merge_sentence_issues(&self.text, &self.issues, sentence, fresh);
        self.replace_issues(merged);
    }

    pub fn complete(&mut self, request: &AnalysisRequest, response: AnalyzerResponse) -> Completion {
        if !self.streams.is_current(&request.ticket) {
            return Completion::Stale;
        }
        let issues = positioned_issues(&request.text, response);
        match request.ticket.stream {
            StreamKey::Document => {
                let (issues, dropped) = if request.text == self.text {
                    (issues, 0)
                } else {
                    let script = EditScript::compute(&request.text, &self.text);
                    let report = rebase_issues(&script, &issues);
                    let dropped = report.dropped.len();
                    (report.issues, dropped)
                };
                let count = issues.len();
                self.replace_issues(issues);
                Completion::Applied {
                    issues: count,
                    dropped,
                }
            }
            StreamKey::Sentence(index) => {
                self.cache
                    .insert(&request.text, issues.clone(), self.scheduler.now());
                let Some(sentence) = self
                    .sentences
                    .get(index)
                    .copied()
                    .filter(|s| s.core(&self.text) == request.text)
                else {
                    debug!(target: "session.engine", sentence = index, "sentence moved; dropping");
                    return Completion::Stale;
                };
                let count = issues.len();
                self.merge_sentence(&sentence, &issues);
                Completion::Applied {
                    issues: count,
                    dropped: 0,
                }
            }
        }
    }

    pub fn handle_event(&mut self, event: AnalysisEvent) -> Completion {
        match event {
            AnalysisEvent::Completed { request, response } => self.complete(&request, response),
            AnalysisEvent::Failed { request, error } => {
                if self.streams.is_current(&request.ticket) {
                    warn!(target: "session.engine", stream = ?request.ticket.stream, %error, "analysis failed");
                    Completion::Failed
                } else {
                    Completion::Stale
                }
            }
        }
    }

    /// Apply one issue's suggestion to the surface. When the surface text
    /// drifted from the snapshot, or the surface refuses the exact span, the
    /// nearest occurrence of `original` is tried before giving up.
    pub fn apply_issue(
        &mut self,
        id: IssueId,
        surface: &mut dyn TextSurface,
    ) -> Result<(), ApplyError> {
        let idx = self.index_of(id).ok_or(ApplyError::Unresolvable)?;
        let issue = self.issues[idx].clone();
        if issue.is_noop() {
            return Err(ApplyError::NoOp);
        }
        let span = self.span_of(id).ok_or(ApplyError::Unresolvable)?;
        let exact = surface.text() == self.text && surface.replace_range(span, &issue.suggestion);
        if !exact {
            debug!(target: "session.engine", id = id.0, "exact replace failed; searching");
            let near = locate_near(surface.text(), &issue.original, span.start)
                .ok_or(ApplyError::Conflict)?;
            if !surface.replace_range(near, &issue.suggestion) {
                return Err(ApplyError::SurfaceRejected);
            }
        }
        self.retire_applied(&[idx], surface.text().to_string());
        Ok(())
    }

    /// Apply every applicable issue. Spans come from the current resolution,
    /// so repeated `original`s apply to their own occurrences.
    pub fn apply_all_to_surface(
        &mut self,
        surface: &mut dyn TextSurface,
    ) -> Result<BulkApplyReport, ApplyError> {
        if surface.text() != self.text {
            self.set_text(surface.text());
        }
        let pinned = self.pinned_issues();
        let report = apply_all(&self.text, &pinned);
        let mut done = Vec::with_capacity(report.applied.len());
        for &idx in report.applied.iter().rev() {
            let Some(span) = pinned[idx].explicit_span() else {
                continue;
            };
            if !surface.replace_range(span, &pinned[idx].suggestion) {
                self.retire_applied(&done, surface.text().to_string());
                return Err(ApplyError::SurfaceRejected);
            }
            done.push(idx);
        }
        self.retire_applied(&done, surface.text().to_string());
        Ok(report)
    }

    pub fn notify(&mut self, triggers: LayoutTrigger) {
        self.sync.notify(triggers);
    }

    /// Periodic fallback: compare the surface style signature and re-arm.
    pub fn poll(&mut self, surface: &dyn TextSurface) -> bool {
        let changed = self.sync.poll(surface.style_signature());
        self.sync.schedule_poll();
        changed
    }

    pub fn set_page_scroll(&mut self, scroll: ScrollOffset) {
        self.measurer.set_page_scroll(scroll);
        self.occlusion.invalidate();
        self.rects.clear();
    }

    pub fn hover_sentence(&mut self, index: Option<usize>) {
        let index = index.filter(|&i| i < self.sentences.len());
        if index != self.active_sentence {
            self.active_sentence = index;
            self.frame_dirty = true;
        }
    }

    /// Drop cached analyses older than the configured age.
    pub fn housekeeping(&mut self) -> usize {
        self.cache
            .evict_older_than(self.config.cache_max_age, self.scheduler.now())
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn rect_key(&self) -> RectKey {
        RectKey {
            layout_version: self.sync.version(),
            text_signature: text_signature(&self.text),
            issue_signature: issue_set_signature(&self.ids),
        }
    }

    /// Resolved issues in document order.
    fn measure_items(&self) -> Vec<(IssueId, Span)> {
        let mut items: Vec<(IssueId, Span)> = self
            .positions
            .iter()
            .filter_map(|p| Some((self.ids[p.index], p.span?)))
            .collect();
        items.sort_by_key(|(id, span)| (span.start, span.end, *id));
        items
    }

    /// Frame callback. Returns a frame when the highlights changed and every
    /// rectangle of the current key has been measured; `None` while a pass
    /// is still pending or nothing changed.
    pub fn on_frame(&mut self, surface: &dyn TextSurface) -> Option<HighlightFrame> {
        let revision = surface.revision();
        if self.seen_revision != Some(revision) {
            if surface.text() != self.text {
                self.set_text(surface.text());
            }
            self.seen_revision = Some(revision);
        }
        if let Some(update) = self.sync.on_frame(surface) {
            self.occlusion.note_movement(update.moved_px);
        }
        let key = self.rect_key();
        if !self.rects.validate(key) {
            self.pass = Some(MeasurePass::new(
                key.layout_version,
                self.measure_items(),
                self.config.frame_budget,
            ));
            self.frame_dirty = true;
        }
        let progress = self
            .pass
            .as_mut()
            .map(|pass| pass.step(surface, &self.measurer, self.scheduler.as_ref()));
        match progress {
            Some(PassProgress::Pending) => return None,
            Some(PassProgress::Done) => {
                if let Some(pass) = self.pass.take() {
                    let shift = self.measurer.viewport_shift(surface);
                    for (id, rects) in self.occlusion.filter(surface, shift, pass.into_results()) {
                        self.rects.insert_issue(id, rects);
                    }
                }
            }
            None => {}
        }
        if !self.frame_dirty {
            return None;
        }
        self.frame_dirty = false;
        Some(self.build_frame(surface))
    }

    /// Measure synchronously until a frame is available. Used by batch
    /// callers that have no frame loop.
    pub fn render_now(&mut self, surface: &dyn TextSurface) -> HighlightFrame {
        if self.sync.version() == 0 {
            self.notify(LayoutTrigger::RESIZE);
        }
        loop {
            if let Some(frame) = self.on_frame(surface) {
                return frame;
            }
            if self.pass.is_none() {
                return self.build_frame(surface);
            }
        }
    }

    fn sentence_rects(&mut self, surface: &dyn TextSurface, index: usize) -> Vec<Rect> {
        if let Some(rects) = self.rects.sentence(index) {
            return rects.to_vec();
        }
        let Some(sentence) = self.sentences.get(index) else {
            return Vec::new();
        };
        let span = Span::new(sentence.core_start, sentence.core_end);
        let rects = self.measurer.measure(surface, span);
        self.rects.insert_sentence(index, rects.clone());
        rects
    }

    fn build_frame(&mut self, surface: &dyn TextSurface) -> HighlightFrame {
        let pairs = self
            .measure_items()
            .into_iter()
            .map(|(id, _)| (id, self.rects.issue(id).map(<[Rect]>::to_vec).unwrap_or_default()))
            .collect();
        let frame = HighlightFrame::new(self.sync.version(), self.measurer.space(), pairs);
        match self.active_sentence {
            Some(index) => {
                let rects = self.sentence_rects(surface, index);
                frame.with_sentence(rects)
            }
            None => frame,
        }
    }
}
