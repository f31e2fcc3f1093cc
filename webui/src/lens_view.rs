//! Full-screen lens over the visible sequence.

use assets_plus_gallery::overlay::{LensCommand, Point};
use assets_plus_gallery::AssetKind;
use dioxus::prelude::*;

use crate::api;
use crate::state::{PanelState, WorkflowAction};
use crate::ui_utils::fmt_bytes;

const LENS_STAGE_ID: &str = "ap-lens-stage";

// Cursor position relative to the stage centre, the lens zoom origin.
fn from_stage_centre(x: f64, y: f64) -> Point {
    let rect = web_sys::window()
        .and_then(|win| win.document())
        .and_then(|doc| doc.get_element_by_id(LENS_STAGE_ID))
        .map(|el| el.get_bounding_client_rect());
    match rect {
        Some(r) => Point::from_stage_centre(Point::new(x, y), Point::new(r.left(), r.top()), (r.width(), r.height())),
        None => Point::ORIGIN,
    }
}

#[component]
pub fn LensView(panel: PanelState) -> Element {
    let mut drag = use_signal(|| None::<(f64, f64)>);

    let lens = panel.lens.read().clone();
    let Some(relpath) = lens.current().map(str::to_string) else {
        return rsx! {};
    };
    let root = *panel.root.read();
    let visible = panel.visible();
    let position = lens.index_in(&visible).map(|i| format!("{} / {}", i + 1, visible.len())).unwrap_or_default();
    let item = panel.feed.read().get(&relpath).cloned();
    let is_video = item.as_ref().is_some_and(|i| i.kind == AssetKind::Video);
    let details = item.as_ref().map(|i| fmt_bytes(i.size)).unwrap_or_default();
    let src = api::endpoints().file(root, &relpath);
    let transform = lens.css_transform();
    let rp_copy = relpath.clone();
    let rp_save = relpath.clone();

    rsx! {
        div {
            class: "lens",
            tabindex: "0",
            onmounted: move |e: MountedEvent| async move {
                let _ = e.set_focus(true).await;
            },
            onkeydown: move |e: KeyboardEvent| {
                if let Some(cmd) = LensCommand::from_key(&e.key().to_string()) {
                    e.prevent_default();
                    panel.lens_command(cmd);
                }
            },
            div { class: "lens-bar",
                span { "{position}" }
                span { class: "lens-title", "{relpath} · {details}" }
                button { onclick: move |_| panel.lens_command(LensCommand::Prev), {panel.t("lens.prev")} }
                button { onclick: move |_| panel.lens_command(LensCommand::Next), {panel.t("lens.next")} }
                button { onclick: move |_| panel.lens_command(LensCommand::ResetZoom), {panel.t("lens.zoom_reset")} }
                button { onclick: move |_| panel.workflow(rp_copy.clone(), WorkflowAction::Copy), {panel.t("lens.copy_workflow")} }
                button { onclick: move |_| panel.workflow(rp_save.clone(), WorkflowAction::Download), {panel.t("lens.download_workflow")} }
                button { onclick: move |_| panel.lens_command(LensCommand::Download), {panel.t("lens.download")} }
                button { class: "error", onclick: move |_| panel.lens_command(LensCommand::Delete), {panel.t("lens.delete")} }
                button { onclick: move |_| panel.lens_command(LensCommand::Close), {panel.t("lens.close")} }
            }
            div {
                id: LENS_STAGE_ID,
                class: "lens-stage",
                onwheel: move |e: WheelEvent| {
                    let p = e.client_coordinates();
                    panel.wheel(e.delta().strip_units().y, from_stage_centre(p.x, p.y));
                },
                onmousedown: move |e: MouseEvent| {
                    let p = e.client_coordinates();
                    drag.set(Some((p.x, p.y)));
                },
                onmousemove: move |e: MouseEvent| {
                    let last = *drag.read();
                    if let Some((x, y)) = last {
                        let p = e.client_coordinates();
                        panel.pan(p.x - x, p.y - y);
                        drag.set(Some((p.x, p.y)));
                    }
                },
                onmouseup: move |_| drag.set(None),
                onmouseleave: move |_| drag.set(None),
                if is_video {
                    video { src: "{src}", controls: true, autoplay: true }
                } else {
                    img { src: "{src}", alt: "{relpath}", draggable: "false", style: "transform: {transform};" }
                }
            }
        }
    }
}
