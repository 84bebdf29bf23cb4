#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-trialmatch-ui]";

/// CSS mặc định của dashboard cùng các design token dễ ghi đè.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --tm-font-family: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  --tm-bg: #f8fafc;
  --tm-card-bg: #ffffff;
  --tm-card-border: rgba(148, 163, 184, 0.28);
  --tm-radius: 14px;
  --tm-text: #1f2933;
  --tm-muted: #52606d;
  --tm-heading: #11181c;
  --tm-accent: #2563eb;
  --tm-accent-soft: rgba(37, 99, 235, 0.1);
  --tm-positive: #047857;
  --tm-negative: #b42318;
  --tm-excellent: #067647;
  --tm-excellent-bg: rgba(6, 118, 71, 0.12);
  --tm-good: #b54708;
  --tm-good-bg: rgba(250, 204, 21, 0.18);
  --tm-fair: #c2410c;
  --tm-fair-bg: rgba(249, 115, 22, 0.14);
  --tm-error-bg: rgba(180, 35, 24, 0.08);
}

.tm-root {
  font-family: var(--tm-font-family);
  background: var(--tm-bg);
  color: var(--tm-text);
  min-height: 100vh;
}

.tm-navbar {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 16px 32px;
  background: var(--tm-card-bg);
  border-bottom: 1px solid var(--tm-card-border);
}

.tm-brand {
  font-size: 1.2rem;
  font-weight: 700;
  color: var(--tm-heading);
}

.tm-nav-items {
  display: flex;
  gap: 8px;
}

.tm-nav-item {
  border: none;
  background: transparent;
  color: var(--tm-muted);
  padding: 8px 14px;
  border-radius: 999px;
  font-weight: 600;
  cursor: pointer;
}

.tm-nav-item.is-active {
  background: var(--tm-accent-soft);
  color: var(--tm-accent);
}

.tm-main {
  max-width: 1120px;
  margin: 0 auto;
  padding: 28px 32px 48px;
  display: flex;
  flex-direction: column;
  gap: 24px;
}

.tm-card {
  background: var(--tm-card-bg);
  border: 1px solid var(--tm-card-border);
  border-radius: var(--tm-radius);
  padding: 20px 24px;
}

.tm-card h2,
.tm-card h3 {
  margin: 0 0 12px;
  color: var(--tm-heading);
}

.tm-metric-grid {
  display: grid;
  grid-template-columns: repeat(4, minmax(0, 1fr));
  gap: 16px;
}

.tm-metric {
  display: flex;
  flex-direction: column;
  gap: 4px;
}

.tm-metric-label {
  font-size: 0.8rem;
  text-transform: uppercase;
  letter-spacing: 0.04em;
  color: var(--tm-muted);
}

.tm-metric-value {
  font-size: 1.8rem;
  font-weight: 700;
  font-variant-numeric: tabular-nums;
  color: var(--tm-heading);
}

.tm-panels {
  display: grid;
  grid-template-columns: repeat(2, minmax(0, 1fr));
  gap: 16px;
}

.tm-placeholder {
  color: var(--tm-muted);
  font-style: italic;
  padding: 24px 0;
  text-align: center;
}

.tm-error {
  display: flex;
  align-items: center;
  justify-content: space-between;
  gap: 12px;
  background: var(--tm-error-bg);
  color: var(--tm-negative);
  border-radius: var(--tm-radius);
  padding: 14px 18px;
}

.tm-button {
  border: none;
  border-radius: 10px;
  padding: 10px 18px;
  font-weight: 600;
  cursor: pointer;
  background: var(--tm-accent);
  color: #ffffff;
}

.tm-button[disabled] {
  opacity: 0.6;
  cursor: progress;
}

.tm-button.is-secondary {
  background: transparent;
  color: var(--tm-accent);
  border: 1px solid var(--tm-accent);
}

.tm-search {
  width: 100%;
  padding: 10px 14px;
  border-radius: 10px;
  border: 1px solid var(--tm-card-border);
  font-size: 0.95rem;
}

.tm-table {
  width: 100%;
  border-collapse: collapse;
}

.tm-table th,
.tm-table td {
  text-align: left;
  padding: 10px 8px;
  border-bottom: 1px solid var(--tm-card-border);
}

.tm-table th {
  font-size: 0.78rem;
  text-transform: uppercase;
  color: var(--tm-muted);
}

.tm-info-grid {
  display: grid;
  grid-template-columns: repeat(3, minmax(0, 1fr));
  gap: 16px;
}

.tm-history {
  display: grid;
  grid-template-columns: repeat(2, minmax(0, 1fr));
  gap: 16px;
}

.tm-history ul {
  margin: 0;
  padding-left: 18px;
}

.tm-more {
  color: var(--tm-muted);
  font-style: italic;
  list-style: none;
}

.tm-match-list {
  display: flex;
  flex-direction: column;
  gap: 14px;
  list-style: none;
  padding: 0;
  margin: 0;
}

.tm-match-header {
  display: flex;
  align-items: flex-start;
  justify-content: space-between;
  gap: 12px;
}

.tm-match-rank {
  font-weight: 700;
  color: var(--tm-accent);
  margin-right: 8px;
}

.tm-match-meta {
  display: flex;
  gap: 12px;
  font-size: 0.85rem;
  color: var(--tm-muted);
  margin: 6px 0 10px;
}

.tm-match-meta a {
  color: var(--tm-accent);
}

.tm-score {
  display: inline-flex;
  flex-direction: column;
  align-items: center;
  border-radius: 12px;
  padding: 8px 12px;
  min-width: 88px;
}

.tm-score-value {
  font-size: 1.3rem;
  font-weight: 700;
  font-variant-numeric: tabular-nums;
}

.tm-score-tier {
  font-size: 0.75rem;
  font-weight: 600;
}

.score-bg-excellent { background: var(--tm-excellent-bg); }
.score-text-excellent { color: var(--tm-excellent); }
.score-bg-good { background: var(--tm-good-bg); }
.score-text-good { color: var(--tm-good); }
.score-bg-fair { background: var(--tm-fair-bg); }
.score-text-fair { color: var(--tm-fair); }

.tm-reasons {
  list-style: none;
  padding: 0;
  margin: 0;
  display: flex;
  flex-direction: column;
  gap: 4px;
}

.tm-reason {
  display: flex;
  gap: 8px;
  font-size: 0.9rem;
}

.tm-reason[data-polarity="positive"] .tm-reason-icon { color: var(--tm-positive); }
.tm-reason[data-polarity="negative"] .tm-reason-icon { color: var(--tm-negative); }

.tm-link-button {
  align-self: flex-start;
  margin-top: 12px;
  border: none;
  background: transparent;
  color: var(--tm-accent);
  font-weight: 600;
  padding: 0;
  cursor: pointer;
}

.tm-trial-details {
  margin-top: 12px;
  padding-top: 12px;
  border-top: 1px solid var(--tm-card-border);
}

.tm-trial-facts {
  display: grid;
  grid-template-columns: max-content 1fr;
  gap: 4px 16px;
  margin: 0 0 12px;
}

.tm-trial-facts dt {
  color: var(--tm-muted);
  font-weight: 600;
}

.tm-trial-facts dd {
  margin: 0;
}

.tm-criteria {
  white-space: pre-wrap;
  font: inherit;
  font-size: 0.85rem;
  color: var(--tm-muted);
  margin: 0;
}

.tm-form {
  display: grid;
  grid-template-columns: repeat(2, minmax(0, 1fr));
  gap: 16px;
}

.tm-field {
  display: flex;
  flex-direction: column;
  gap: 6px;
}

.tm-field input,
.tm-field select,
.tm-field textarea {
  padding: 10px 12px;
  border-radius: 10px;
  border: 1px solid var(--tm-card-border);
  font: inherit;
}

.tm-form-actions {
  grid-column: 1 / -1;
}

@media (max-width: 860px) {
  .tm-metric-grid,
  .tm-panels,
  .tm-info-grid,
  .tm-history,
  .tm-form {
    grid-template-columns: 1fr;
  }

  .tm-navbar {
    flex-direction: column;
    gap: 12px;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document không có thẻ <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-trialmatch-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
