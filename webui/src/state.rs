//! Panel state: one signal per engine, mutated only through [`PanelState`].

use assets_plus_gallery::actions::{apply_delete, parse_workflow, plan_delete, workflow_filename, ActionTarget, DeletePlan};
use assets_plus_gallery::feed::{should_load_more, AssetFeed};
use assets_plus_gallery::i18n::{normalize_locale, Translations};
use assets_plus_gallery::model::{DeleteRequest, ThumbnailQuality};
use assets_plus_gallery::overlay::{Lens, LensCommand, LensEffect, Point};
use assets_plus_gallery::selection::Selection;
use assets_plus_gallery::settings::{EffectiveSettings, HostSettings};
use assets_plus_gallery::view::{KindFilter, SortOrder, ViewFilter};
use assets_plus_gallery::{AssetItem, DeleteMode, PanelConfig, Root};
use dioxus::prelude::*;
use web_sys::console;

use crate::api;
use crate::ui_utils::{
    browser_locale, copy_to_clipboard, download_json, load_host_settings, save_host_settings, show_toast,
    trigger_download,
};

pub const GRID_ID: &str = "ap-grid";
const SCROLL_THRESHOLD_PX: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Copy,
    Download,
}

#[derive(Clone, Copy, PartialEq)]
pub struct PanelState {
    pub root: Signal<Root>,
    pub server: Signal<PanelConfig>,
    pub host: Signal<HostSettings>,
    pub tr: Signal<Translations>,
    pub feed: Signal<AssetFeed>,
    pub filter: Signal<ViewFilter>,
    pub selection: Signal<Selection>,
    pub lens: Signal<Lens>,
    pub confirm: Signal<Option<DeleteRequest>>,
    pub error: Signal<Option<String>>,
    // bumped on every reload; responses from older generations are dropped
    generation: Signal<u64>,
}

pub fn use_panel_state() -> PanelState {
    let server = PanelConfig::default();
    let limit = server.list_limit;
    PanelState {
        root: use_signal(|| Root::Output),
        server: use_signal(|| server),
        host: use_signal(load_host_settings),
        tr: use_signal(Translations::default),
        feed: use_signal(|| AssetFeed::new(limit)),
        filter: use_signal(ViewFilter::default),
        selection: use_signal(|| Selection::new(Root::Output)),
        lens: use_signal(Lens::new),
        confirm: use_signal(|| None),
        error: use_signal(|| None),
        generation: use_signal(|| 0),
    }
}

fn file_name(relpath: &str) -> &str {
    relpath.rsplit('/').next().unwrap_or(relpath)
}

impl PanelState {
    pub fn settings(&self) -> EffectiveSettings {
        EffectiveSettings::merge(&self.server.read(), &self.host.read())
    }

    pub fn t(&self, key: &str) -> String {
        self.tr.read().get(key).to_string()
    }

    pub fn tf(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.tr.read().format(key, args)
    }

    /// Loaded items passing the filter, in display order.
    pub fn visible_items(&self) -> Vec<AssetItem> {
        let feed = self.feed.read();
        self.filter
            .read()
            .apply(feed.items())
            .into_iter()
            .filter_map(|relpath| feed.get(&relpath).cloned())
            .collect()
    }

    pub fn visible(&self) -> Vec<String> {
        self.filter.read().apply(self.feed.read().items())
    }

    // ----- Laden -----

    pub async fn bootstrap(mut self) {
        match api::config().await {
            Ok(cfg) => self.server.set(cfg),
            Err(e) => {
                console::warn_1(&format!("config: {}", e).into());
                self.error.set(Some(e));
            }
        }
        let locale = match self.host.read().locale.clone() {
            Some(locale) => locale,
            None => browser_locale().map(|tag| normalize_locale(&tag)).unwrap_or_default(),
        };
        self.load_translations(locale).await;
        self.reload();
    }

    pub async fn load_translations(mut self, locale: String) {
        match api::i18n(&locale).await {
            Ok(resp) => self.tr.set(Translations::from(resp)),
            Err(e) => console::warn_1(&format!("i18n {}: {}", locale, e).into()),
        }
    }

    /// Drops the feed and starts again from the first page.
    pub fn reload(mut self) {
        *self.generation.write() += 1;
        let limit = self.settings().list_limit;
        {
            let mut feed = self.feed.write();
            feed.set_limit(limit);
            feed.reset();
        }
        self.error.set(None);
        self.load_more();
    }

    pub fn load_more(mut self) {
        let Some(req) = self.feed.write().begin_page() else { return };
        let root = *self.root.read();
        let recursive = self.settings().recursive;
        let generation = *self.generation.read();
        spawn(async move {
            let result = api::list_page(root, &req, recursive).await;
            if *self.generation.read() != generation {
                return;
            }
            match result {
                Ok(page) => {
                    self.feed.write().finish_page(page);
                    self.error.set(None);
                    self.maybe_load_more();
                }
                Err(e) => {
                    self.feed.write().fail_page();
                    self.error.set(Some(e));
                }
            }
        });
    }

    /// Infinite scroll: loads the next page once the grid bottom is near.
    pub fn maybe_load_more(self) {
        let Some(grid) = web_sys::window().and_then(|w| w.document()).and_then(|d| d.get_element_by_id(GRID_ID))
        else {
            return;
        };
        if should_load_more(
            grid.scroll_top() as f64,
            grid.client_height() as f64,
            grid.scroll_height() as f64,
            SCROLL_THRESHOLD_PX,
        ) {
            self.load_more();
        }
    }

    pub async fn poll_once(mut self) {
        let Some(req) = self.feed.write().begin_poll() else { return };
        let root = *self.root.read();
        let recursive = self.settings().recursive;
        let generation = *self.generation.read();
        let result = api::poll(root, &req, recursive).await;
        if *self.generation.read() != generation {
            return;
        }
        match result {
            Ok(page) => {
                let anchor = self.lens.read().current().map(str::to_string);
                let outcome = self.feed.write().finish_poll(page, anchor.as_deref());
                if outcome.overflowed {
                    // zu viele neue Dateien: Lücke möglich, komplett neu laden
                    self.reload();
                }
            }
            Err(e) => {
                self.feed.write().fail_poll();
                console::warn_1(&format!("poll: {}", e).into());
            }
        }
    }

    // ----- Root, Filter -----

    pub fn switch_root(mut self, root: Root) {
        if *self.root.read() == root {
            return;
        }
        self.root.set(root);
        self.selection.write().set_root(root);
        self.lens.write().close();
        self.reload();
    }

    fn update_filter(mut self, change: impl FnOnce(&mut ViewFilter)) {
        change(&mut *self.filter.write());
        self.lens.write().close();
    }

    pub fn set_query(self, query: String) {
        self.update_filter(|f| f.query = query);
    }

    pub fn set_kind(self, kind: KindFilter) {
        self.update_filter(|f| f.kind = kind);
    }

    pub fn toggle_workflow_only(self) {
        self.update_filter(|f| f.workflow_only = !f.workflow_only);
    }

    pub fn set_sort(self, sort: SortOrder) {
        self.update_filter(|f| f.sort = sort);
    }

    // ----- Auswahl -----

    pub fn toggle_selected(mut self, relpath: &str) {
        self.selection.write().toggle(relpath);
    }

    pub fn select_all(mut self) {
        let visible = self.visible();
        self.selection.write().select_all(&visible);
    }

    pub fn invert_selection(mut self) {
        let visible = self.visible();
        self.selection.write().invert(&visible);
    }

    pub fn clear_selection(mut self) {
        self.selection.write().clear();
    }

    // ----- Lens -----

    pub fn open_lens(mut self, relpath: &str) {
        let visible = self.visible();
        self.lens.write().open(relpath, &visible);
    }

    pub fn lens_command(mut self, command: LensCommand) {
        let visible = self.visible();
        let effect = self.lens.write().dispatch(command, &visible);
        match effect {
            LensEffect::Delete(relpath) => self.request_delete(ActionTarget::Single(relpath)),
            LensEffect::Download(relpath) => self.download_one(&relpath),
            LensEffect::OpenWorkflow(relpath) => self.workflow(relpath, WorkflowAction::Copy),
            LensEffect::Redraw | LensEffect::Closed | LensEffect::None => {}
        }
        // am Ende der geladenen Liste nachladen
        let at_end = self.lens.read().index_in(&visible).is_some_and(|i| i + 1 >= visible.len());
        if at_end && self.feed.read().has_more() {
            self.load_more();
        }
    }

    pub fn wheel(mut self, delta_y: f64, cursor: Point) {
        self.lens.write().wheel(delta_y, cursor);
    }

    pub fn pan(mut self, dx: f64, dy: f64) {
        self.lens.write().pan(dx, dy);
    }

    // ----- Aktionen -----

    pub fn request_delete(mut self, target: ActionTarget) {
        let confirm = self.settings().confirm_delete;
        let mode = self.host.read().delete_mode;
        let plan = plan_delete(&target, &self.selection.read(), mode, confirm);
        match plan {
            DeletePlan::Nothing => {}
            DeletePlan::NeedsConfirmation(req) => self.confirm.set(Some(req)),
            DeletePlan::Ready(req) => self.run_delete(req),
        }
    }

    /// Mode the server will apply to a pending request.
    pub fn delete_mode_of(&self, req: &DeleteRequest) -> DeleteMode {
        req.mode.unwrap_or_else(|| self.settings().delete_mode)
    }

    pub fn confirm_delete(mut self) {
        let pending = self.confirm.write().take();
        if let Some(req) = pending {
            if let DeletePlan::Ready(req) = DeletePlan::NeedsConfirmation(req).confirm() {
                self.run_delete(req);
            }
        }
    }

    pub fn cancel_delete(mut self) {
        self.confirm.set(None);
    }

    fn run_delete(mut self, req: DeleteRequest) {
        let root = *self.root.read();
        spawn(async move {
            match api::delete(root, &req).await {
                Ok(resp) => {
                    if *self.root.read() != root {
                        return;
                    }
                    let filter = self.filter.read().clone();
                    let applied = apply_delete(
                        &resp,
                        &mut self.feed.write(),
                        &mut self.selection.write(),
                        &mut self.lens.write(),
                        &filter,
                    );
                    if applied.removed > 0 {
                        show_toast(&self.tf("toast.removed", &[("count", applied.removed.to_string().as_str())]));
                    }
                    if applied.failed > 0 {
                        show_toast(&self.tf("toast.failed", &[("count", applied.failed.to_string().as_str())]));
                    }
                }
                Err(e) => show_toast(&self.tf("status.error", &[("error", e.as_str())])),
            }
        });
    }

    pub fn workflow(self, relpath: String, action: WorkflowAction) {
        let root = *self.root.read();
        spawn(async move {
            let meta = match api::meta(root, &relpath).await {
                Ok(meta) => meta,
                Err(e) => {
                    show_toast(&self.tf("status.error", &[("error", e.as_str())]));
                    return;
                }
            };
            let Some(workflow) = parse_workflow(&meta) else {
                show_toast(&self.t("toast.no_workflow"));
                return;
            };
            match action {
                WorkflowAction::Copy => copy_to_clipboard(
                    workflow.to_string(),
                    self.t("toast.workflow_copied"),
                    self.tf("status.error", &[("error", "clipboard")]),
                ),
                WorkflowAction::Download => download_json(&workflow_filename(&relpath), &workflow),
            }
        });
    }

    pub fn download_one(self, relpath: &str) {
        let url = api::endpoints().file(*self.root.read(), relpath);
        trigger_download(&url, Some(file_name(relpath)));
    }

    pub fn download_selection(self) {
        for relpath in self.selection.read().relpaths() {
            self.download_one(&relpath);
        }
    }

    pub fn clear_thumbs(self) {
        spawn(async move {
            match api::thumb_clear().await {
                Ok(resp) => show_toast(&self.tf("toast.thumbs_cleared", &[("count", resp.removed.to_string().as_str())])),
                Err(e) => show_toast(&self.tf("status.error", &[("error", e.as_str())])),
            }
        });
    }

    // ----- Einstellungen -----

    /// Current value of a setting as shown in the settings drawer.
    pub fn setting_value(&self, id: &str) -> String {
        let eff = self.settings();
        match id {
            "list_limit" => eff.list_limit.to_string(),
            "poll_seconds" => eff.poll_seconds.to_string(),
            "delete_mode" => eff.delete_mode.as_str().to_string(),
            "thumbnail_quality" => {
                let quality = self
                    .host
                    .read()
                    .thumbnail_quality
                    .unwrap_or_else(|| ThumbnailQuality::from_pixel_size(eff.thumbnail_size.0 as i64));
                match quality {
                    ThumbnailQuality::Low => "low".to_string(),
                    ThumbnailQuality::High => "high".to_string(),
                }
            }
            "confirm_delete" => eff.confirm_delete.to_string(),
            "recursive" => eff.recursive.to_string(),
            "locale" => self.tr.read().locale().to_string(),
            _ => String::new(),
        }
    }

    pub fn update_setting(mut self, id: &str, value: String) {
        let before = self.host.read().clone();
        let mut host = before.clone();
        match id {
            "list_limit" => host.list_limit = value.trim().parse::<usize>().ok().filter(|v| *v > 0),
            "poll_seconds" => host.poll_seconds = value.trim().parse::<u64>().ok().filter(|v| *v > 0),
            "delete_mode" => host.delete_mode = value.parse::<DeleteMode>().ok(),
            "thumbnail_quality" => host.thumbnail_quality = ThumbnailQuality::parse_lenient(&value),
            "confirm_delete" => host.confirm_delete = Some(value == "true"),
            "recursive" => host.recursive = Some(value == "true"),
            "locale" => host.locale = Some(normalize_locale(&value)).filter(|l| !l.is_empty()),
            _ => return,
        }
        if host == before {
            return;
        }
        save_host_settings(&host);
        let locale_changed = host.locale != before.locale;
        let listing_changed = host.list_limit != before.list_limit || host.recursive != before.recursive;
        self.host.set(host);

        if locale_changed {
            let locale = self.settings().locale;
            spawn(async move { self.load_translations(locale).await });
        }
        if listing_changed {
            self.reload();
        }
    }
}
