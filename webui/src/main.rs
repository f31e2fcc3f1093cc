use assets_plus_gallery::actions::ActionTarget;
use assets_plus_gallery::view::{KindFilter, SortOrder};
use assets_plus_gallery::{AssetItem, AssetKind, Root};
use dioxus::events::FormData;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

mod api;
mod lens_view;
mod settings_view;
mod state;
mod ui_utils;

use lens_view::LensView;
use settings_view::SettingsView;
use state::{use_panel_state, PanelState, GRID_ID};
use ui_utils::{fmt_bytes, fmt_time};

const STYLE: &str = r#"
body { margin: 0; background: #0b0c0f; color: #e5e7eb; font-family: system-ui, sans-serif; }
.app-header { display: flex; gap: 12px; align-items: center; padding: 8px 12px; border-bottom: 1px solid #222533; flex-wrap: wrap; }
.toolbar { display: flex; gap: 8px; align-items: center; flex-wrap: wrap; padding: 6px 12px; }
.tab { background: #141722; color: #cbd5e1; border: 1px solid #222533; border-radius: 6px; padding: 4px 10px; cursor: pointer; }
.tab.active { background: #1e3a8a; color: #fff; }
button, select, input { background: #141722; color: #e5e7eb; border: 1px solid #222533; border-radius: 6px; padding: 4px 8px; }
#ap-grid { height: calc(100vh - 130px); overflow-y: auto; padding: 8px 12px; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 10px; }
.tile { position: relative; background: #0f1117; border: 1px solid #222533; border-radius: 8px; overflow: hidden; cursor: pointer; }
.tile.selected { border-color: #60a5fa; box-shadow: 0 0 0 2px #60a5fa55; }
.tile img, .tile video { width: 100%; aspect-ratio: 1; object-fit: cover; display: block; background: #000; }
.tile-check { position: absolute; top: 6px; left: 6px; }
.tile-caption { padding: 4px 6px; font-size: 12px; white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
.tile-meta { padding: 0 6px 6px; font-size: 11px; color: #9aa0a6; display: flex; gap: 6px; }
.badge { background: #3b0764; color: #e9d5ff; border-radius: 4px; padding: 0 4px; }
.status { padding: 4px 12px; color: #a0aec0; font-size: 13px; }
.error { color: #f87171; }
.lens { position: fixed; inset: 0; background: #000e; display: flex; flex-direction: column; z-index: 50; outline: none; }
.lens-bar { display: flex; gap: 8px; align-items: center; padding: 8px 12px; }
.lens-title { flex: 1; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.lens-stage { flex: 1; display: flex; align-items: center; justify-content: center; overflow: hidden; }
.lens-stage img, .lens-stage video { max-width: 100%; max-height: 100%; transform-origin: center; user-select: none; }
.modal { position: fixed; inset: 0; background: #0009; display: flex; align-items: center; justify-content: center; z-index: 60; }
.modal-body { background: #141722; border: 1px solid #222533; border-radius: 10px; padding: 16px; min-width: 320px; display: flex; flex-direction: column; gap: 10px; }
.setting-row { display: flex; justify-content: space-between; gap: 12px; align-items: center; }
.toast-container { position: fixed; bottom: 16px; right: 16px; display: flex; flex-direction: column; gap: 6px; z-index: 70; }
.toast { background: #1f2937; border: 1px solid #374151; border-radius: 6px; padding: 6px 10px; }
"#;

pub fn main() {
    console_error_panic_hook::set_once();
    dioxus_web::launch::launch(app, vec![], Default::default());
}

fn app() -> Element {
    rsx! {
        style { {STYLE} }
        Explorer {}
        // Toast container for notifications
        div { id: "toasts", class: "toast-container" }
    }
}

#[component]
fn Explorer() -> Element {
    let panel = use_panel_state();
    let mut show_settings = use_signal(|| false);

    use_future(move || async move { panel.bootstrap().await });

    // Live-Update: neue Dateien im Hintergrund nachziehen
    use_future(move || async move {
        loop {
            let secs = panel.settings().poll_seconds.clamp(1, 3600);
            TimeoutFuture::new((secs * 1000) as u32).await;
            panel.poll_once().await;
        }
    });

    let items = panel.visible_items();
    let thumb_size = panel.settings().thumbnail_size;
    let total = panel.feed.read().len();
    let loading = panel.feed.read().is_loading();
    let has_more = panel.feed.read().has_more();
    let selected = panel.selection.read().len();
    let lens_open = panel.lens.read().is_open();
    let status = panel.tf(
        "status.count",
        &[
            ("shown", items.len().to_string().as_str()),
            ("total", total.to_string().as_str()),
            ("selected", selected.to_string().as_str()),
        ],
    );
    let pending = panel.confirm.read().clone();

    rsx! {
        div { class: "app-header",
            strong { {panel.t("panel.title")} }
            for r in Root::ALL {
                button {
                    class: if *panel.root.read() == r { "tab active" } else { "tab" },
                    onclick: move |_| panel.switch_root(r),
                    {panel.t(&format!("root.{}", r))}
                }
            }
            button { onclick: move |_| panel.reload(), {panel.t("toolbar.refresh")} }
            button { onclick: move |_| panel.clear_thumbs(), {panel.t("toolbar.clear_thumbs")} }
            button { onclick: move |_| { let open = *show_settings.read(); show_settings.set(!open); }, {panel.t("toolbar.settings")} }
        }
        Toolbar { panel, selected }
        if *show_settings.read() {
            SettingsView { panel, on_close: move |_| show_settings.set(false) }
        }
        div { class: "status",
            "{status}"
            { loading.then(|| rsx!(span { " · ", {panel.t("status.loading")} })) }
            { panel.error.read().as_ref().map(|e| rsx!(span { class: "error", " · ", {panel.tf("status.error", &[("error", e.as_str())])} })) }
        }
        div { id: GRID_ID, onscroll: move |_| panel.maybe_load_more(),
            if items.is_empty() && !loading {
                div { class: "status", {panel.t("status.empty")} }
            }
            div { class: "grid",
                for item in items.iter() {
                    Tile { key: "{item.relpath}", panel, item: item.clone(), thumb_size }
                }
            }
            { (has_more && !loading && total > 0).then(|| rsx!(
                div { style: "text-align:center;margin:12px;",
                    button { onclick: move |_| panel.load_more(), "…" }
                }
            )) }
        }
        if lens_open {
            LensView { panel }
        }
        { pending.map(|req| {
            let mode = panel.delete_mode_of(&req);
            let text = panel.tf(
                "confirm.delete",
                &[("count", req.relpaths.len().to_string().as_str()), ("mode", panel.t(&format!("mode.{}", mode.as_str())).as_str())],
            );
            rsx!(
                div { class: "modal",
                    div { class: "modal-body",
                        p { "{text}" }
                        div { style: "display:flex;gap:8px;justify-content:flex-end;",
                            button { onclick: move |_| panel.cancel_delete(), {panel.t("confirm.cancel")} }
                            button { class: "error", onclick: move |_| panel.confirm_delete(), {panel.t("confirm.yes")} }
                        }
                    }
                }
            )
        }) }
    }
}

#[component]
fn Toolbar(panel: PanelState, selected: usize) -> Element {
    let filter = panel.filter.read().clone();
    let count = selected.to_string();
    rsx! {
        div { class: "toolbar",
            input {
                r#type: "search",
                placeholder: panel.t("search.placeholder"),
                value: "{filter.query}",
                oninput: move |e: Event<FormData>| panel.set_query(e.value()),
            }
            select {
                value: "{kind_value(filter.kind)}",
                oninput: move |e: Event<FormData>| panel.set_kind(parse_kind(&e.value())),
                option { value: "all", {panel.t("filter.kind.all")} }
                option { value: "image", {panel.t("filter.kind.image")} }
                option { value: "video", {panel.t("filter.kind.video")} }
            }
            label { style: "display:flex;gap:6px;align-items:center;",
                input { r#type: "checkbox", checked: filter.workflow_only, oninput: move |_| panel.toggle_workflow_only() }
                {panel.t("filter.workflow")}
            }
            select {
                value: "{filter.sort.as_str()}",
                oninput: move |e: Event<FormData>| panel.set_sort(SortOrder::parse(&e.value())),
                for sort in SortOrder::ALL {
                    option { value: "{sort.as_str()}", {panel.t(&format!("sort.{}", sort.as_str()))} }
                }
            }
            button { onclick: move |_| panel.select_all(), {panel.t("toolbar.select_all")} }
            button { onclick: move |_| panel.invert_selection(), {panel.t("toolbar.invert")} }
            button { onclick: move |_| panel.clear_selection(), {panel.t("toolbar.clear_selection")} }
            button {
                disabled: selected == 0,
                onclick: move |_| panel.download_selection(),
                {panel.tf("toolbar.download", &[("count", count.as_str())])}
            }
            button {
                class: "error",
                disabled: selected == 0,
                onclick: move |_| panel.request_delete(ActionTarget::Selection),
                {panel.tf("toolbar.delete", &[("count", count.as_str())])}
            }
        }
    }
}

fn kind_value(kind: KindFilter) -> &'static str {
    match kind {
        KindFilter::All => "all",
        KindFilter::Image => "image",
        KindFilter::Video => "video",
    }
}

fn parse_kind(value: &str) -> KindFilter {
    match value {
        "image" => KindFilter::Image,
        "video" => KindFilter::Video,
        _ => KindFilter::All,
    }
}

#[component]
fn Tile(panel: PanelState, item: AssetItem, thumb_size: (u32, u32)) -> Element {
    let root = *panel.root.read();
    let selected = panel.selection.read().contains(&item.relpath);
    let thumb = api::endpoints().thumb(root, &item.relpath, thumb_size, item.mtime);
    let rp_open = item.relpath.clone();
    let rp_select = item.relpath.clone();
    rsx! {
        div {
            class: if selected { "tile selected" } else { "tile" },
            title: "{item.relpath}",
            onclick: move |_| panel.open_lens(&rp_open),
            input {
                class: "tile-check",
                r#type: "checkbox",
                checked: selected,
                onclick: move |e: MouseEvent| {
                    e.stop_propagation();
                    panel.toggle_selected(&rp_select);
                },
            }
            if item.kind == AssetKind::Video {
                video { src: "{thumb}", preload: "metadata", muted: true }
            } else {
                img { src: "{thumb}", alt: "{item.filename}", "loading": "lazy" }
            }
            div { class: "tile-caption", "{item.filename}" }
            div { class: "tile-meta",
                span { "{fmt_bytes(item.size)}" }
                span { "{fmt_time(item.mtime)}" }
                if item.has_workflow {
                    span { class: "badge", "WF" }
                }
            }
        }
    }
}
