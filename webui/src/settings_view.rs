use assets_plus_gallery::settings::{SettingKind, SETTING_DEFS};
use dioxus::events::FormData;
use dioxus::prelude::*;

use crate::state::PanelState;

fn choice_label(panel: &PanelState, id: &str, value: &str) -> String {
    match id {
        "delete_mode" => panel.t(&format!("mode.{}", value)),
        "thumbnail_quality" => panel.t(&format!("quality.{}", value)),
        _ => value.to_uppercase(),
    }
}

#[component]
pub fn SettingsView(panel: PanelState, on_close: EventHandler<()>) -> Element {
    rsx! {
        div { class: "modal-body", style: "margin:8px 12px;",
            div { class: "setting-row",
                strong { {panel.t("settings.title")} }
                button { onclick: move |_| on_close.call(()), "×" }
            }
            for def in SETTING_DEFS.iter() {
                div { class: "setting-row", key: "{def.id}",
                    label { {panel.t(def.label_key)} }
                    {
                        let value = panel.setting_value(def.id);
                        match def.kind {
                            SettingKind::Number => rsx! {
                                input {
                                    r#type: "number",
                                    min: "1",
                                    value: "{value}",
                                    onchange: move |e: Event<FormData>| panel.update_setting(def.id, e.value()),
                                }
                            },
                            SettingKind::Toggle => {
                                let on = value == "true";
                                rsx! {
                                    input {
                                        r#type: "checkbox",
                                        checked: on,
                                        oninput: move |_| panel.update_setting(def.id, (!on).to_string()),
                                    }
                                }
                            }
                            SettingKind::Choice(options) => rsx! {
                                select {
                                    value: "{value}",
                                    oninput: move |e: Event<FormData>| panel.update_setting(def.id, e.value()),
                                    for opt in options.iter() {
                                        option { value: "{opt}", selected: *opt == value, {choice_label(&panel, def.id, opt)} }
                                    }
                                }
                            },
                        }
                    }
                }
            }
        }
    }
}
