//! Browser redirects that work inside the Shopify admin iframe.

use axum::response::{Html, IntoResponse, Redirect, Response};

/// Redirects the browser to `url`.
///
/// Embedded apps answer with a small HTML page that navigates the top
/// window, since the admin iframe cannot follow a cross-origin `Location`
/// into the parent. Standalone apps get a plain `303 See Other`.
#[must_use]
pub fn client_redirect(embedded: bool, url: &str) -> Response {
    if embedded {
        Html(redirect_shim(url)).into_response()
    } else {
        Redirect::to(url).into_response()
    }
}

fn redirect_shim(url: &str) -> String {
    // JSON string literals are valid JS; `<` is escaped so the URL cannot close the script.
    let target = serde_json::Value::String(url.to_string())
        .to_string()
        .replace('<', "\\u003c");

    format!(
        r"<!DOCTYPE html>
<html>
  <head>
    <script>
      if (window.self === window.top) {{
        window.location.href = {target};
      }} else {{
        window.top.location.href = {target};
      }}
    </script>
  </head>
</html>
"
    )
}
