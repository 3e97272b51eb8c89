//! Page-side scripts evaluated through [`BrowserSession::evaluate`].
//!
//! Every script is a single expression whose value is JSON-serializable.
//!
//! [`BrowserSession::evaluate`]: crate::session::BrowserSession::evaluate

/// Quote a selector as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

pub const DOCUMENT_TITLE: &str = "document.title";

pub const VIEWPORT_SIZE: &str = "({ width: window.innerWidth, height: window.innerHeight })";

pub const NAVIGATION_TIMING: &str = "(() => { \
    const t = (window.performance || {}).timing || {}; \
    return { navigationStart: t.navigationStart || 0, loadEventEnd: t.loadEventEnd || 0 }; \
})()";

/// Bounded count of rendered elements inside `body`.
pub const VISIBLE_BODY_ELEMENTS: &str = "Array.from(document.querySelectorAll('body *')).slice(0, 500).filter((e) => { \
    const r = e.getBoundingClientRect(); \
    const s = window.getComputedStyle(e); \
    return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; \
}).length";

/// `true` once an element matching `selector` is attached.
pub fn element_present(selector: &str) -> String {
    format!("document.querySelector({}) !== null", js_string(selector))
}

/// `{ total, visible }` for elements matching `selector`.
pub fn element_visibility(selector: &str) -> String {
    format!(
        "(() => {{ \
            const all = Array.from(document.querySelectorAll({})); \
            const visible = all.filter((e) => {{ \
                const r = e.getBoundingClientRect(); \
                const s = window.getComputedStyle(e); \
                return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; \
            }}); \
            return {{ total: all.length, visible: visible.length }}; \
        }})()",
        js_string(selector)
    )
}
