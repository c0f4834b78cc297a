//! Aggregate document and ReDoc page.
//!
//! - `GET /openapi.json`: the document built from the current fragments.
//! - `GET /openapi`: an HTML page rendering that document with ReDoc.

use apispec_contract::AggregateDocument;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::AppError;
use crate::state::ContractState;

pub fn router() -> Router<ContractState> {
    Router::new()
        .route("/openapi.json", get(document))
        .route("/openapi", get(page))
}

async fn document(State(state): State<ContractState>) -> Result<Json<AggregateDocument>, AppError> {
    Ok(Json(state.document()?))
}

async fn page(State(state): State<ContractState>) -> Html<String> {
    let config = state.config();
    Html(render_page(&config.info_or_default().title, &config.redoc_js))
}

/// ReDoc page loading `openapi.json` next to it.
pub fn render_page(title: &str, script_src: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <title>{title}</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>body {{ margin: 0; padding: 0; }}</style>
  </head>
  <body>
    <redoc spec-url="openapi.json"></redoc>
    <script src="{script}"></script>
  </body>
</html>
"#,
        title = escape(title),
        script = escape(script_src),
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_references_document_and_script() {
        let html = render_page("Shop API", "/assets/redoc.js");
        assert!(html.contains("<title>Shop API</title>"));
        assert!(html.contains(r#"<redoc spec-url="openapi.json"></redoc>"#));
        assert!(html.contains(r#"<script src="/assets/redoc.js"></script>"#));
    }

    #[test]
    fn title_is_escaped() {
        let html = render_page("<Tom & Jerry>", "x.js");
        assert!(html.contains("<title>&lt;Tom &amp; Jerry&gt;</title>"));
    }
}
