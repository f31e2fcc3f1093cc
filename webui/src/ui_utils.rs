use assets_plus_gallery::settings::HostSettings;
use js_sys::Date;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

const SETTINGS_KEY: &str = "assets_plus.settings";

// Format bytes using binary units
pub fn fmt_bytes(n: u64) -> String {
    let mut v = n as f64;
    let units = ["B", "KB", "MB", "GB", "TB"];
    let mut i = 0usize;
    while v >= 1024.0 && i < units.len() - 1 {
        v /= 1024.0;
        i += 1;
    }
    if i == 0 {
        format!("{} {}", n, units[0])
    } else if v >= 10.0 {
        format!("{:.0} {}", v, units[i])
    } else {
        format!("{:.1} {}", v, units[i])
    }
}

// Format a UNIX timestamp (seconds) as "YYYY-MM-DD HH:MM", "—" when out of range.
pub fn fmt_time(secs: i64) -> String {
    // Max valid Unix timestamp (year 9999)
    if secs <= 0 || secs > 253402300799 {
        return "—".to_string();
    }
    let d = Date::new(&JsValue::from_f64(secs as f64 * 1000.0));
    let Some(iso) = d.to_iso_string().as_string() else {
        return "—".to_string();
    };
    match iso.split_once('T') {
        Some((date, time)) => format!("{} {}", date, time.chars().take(5).collect::<String>()),
        None => iso,
    }
}

// Copy text to clipboard and toast the outcome
pub fn copy_to_clipboard(text: String, ok_message: String, err_message: String) {
    if let Some(win) = web_sys::window() {
        let promise = win.navigator().clipboard().write_text(&text);
        wasm_bindgen_futures::spawn_local(async move {
            match JsFuture::from(promise).await {
                Ok(_) => show_toast(&ok_message),
                Err(_) => show_toast(&err_message),
            }
        });
    }
}

// Show a transient toast in the #toasts container
pub fn show_toast(message: &str) {
    let Some(win) = web_sys::window() else { return };
    let Some(doc) = win.document() else { return };
    let Some(container) = doc.get_element_by_id("toasts") else { return };
    let Ok(toast) = doc.create_element("div") else { return };
    toast.set_class_name("toast fade-in");
    toast.set_text_content(Some(message));
    if container.append_child(&toast).is_err() {
        return;
    }

    let cb = Closure::wrap(Box::new(move || {
        let _ = container.remove_child(&toast);
    }) as Box<dyn FnMut()>);
    let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 2200);
    cb.forget();
}

fn click_link(href: &str, filename: Option<&str>) {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else { return };
    let Ok(a) = doc.create_element("a") else { return };
    let _ = a.set_attribute("href", href);
    if let Some(name) = filename {
        let _ = a.set_attribute("download", name);
    }
    if let Some(body) = doc.body() {
        let _ = body.append_child(&a);
        if let Some(ae) = a.dyn_ref::<web_sys::HtmlElement>() {
            ae.click();
        }
        let _ = body.remove_child(&a);
    }
}

/// Download from a server URL; `filename` hints the browser's save name.
pub fn trigger_download(url: &str, filename: Option<&str>) {
    click_link(url, filename);
}

// Download a JSON value using a data URI
pub fn download_json(filename: &str, value: &serde_json::Value) {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    let href = format!("data:application/json;charset=utf-8,{}", urlencoding::encode(&text));
    click_link(&href, Some(filename));
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// User overrides persisted in localStorage; unreadable entries count as none.
pub fn load_host_settings() -> HostSettings {
    local_storage()
        .and_then(|s| s.get_item(SETTINGS_KEY).ok().flatten())
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

pub fn save_host_settings(settings: &HostSettings) {
    if let (Some(storage), Ok(raw)) = (local_storage(), serde_json::to_string(settings)) {
        let _ = storage.set_item(SETTINGS_KEY, &raw);
    }
}

/// Browser language tag, e.g. `de-DE`.
pub fn browser_locale() -> Option<String> {
    web_sys::window()?.navigator().language()
}
