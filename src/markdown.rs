//! Markdown rendering for the source split preview

use pulldown_cmark::{html, Options, Parser};

use crate::model::SourceDocument;

/// Convert markdown to a complete styled HTML document
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(markdown, options);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>{}</style>
</head>
<body>
    <div id="content">{}</div>
</body>
</html>"#,
        PREVIEW_CSS, html_output
    )
}

/// Preview document for the source pane's split view
///
/// Markdown sources render; plain-text sources have no preview.
pub fn source_preview_html(source: &SourceDocument) -> Option<String> {
    if source.is_markdown() {
        Some(markdown_to_html(&source.content))
    } else {
        None
    }
}

const PREVIEW_CSS: &str = r#"
* { box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
    font-size: 14px;
    line-height: 1.6;
    color: #24292f;
    background: #ffffff;
    padding: 20px;
    max-width: 800px;
    margin: 0 auto;
}

h1, h2, h3, h4, h5, h6 {
    margin-top: 24px;
    margin-bottom: 16px;
    font-weight: 600;
    line-height: 1.25;
}

h1 {
    font-size: 2em;
    border-bottom: 1px solid #d0d7de;
    padding-bottom: 0.3em;
}

h2 {
    font-size: 1.5em;
    border-bottom: 1px solid #d0d7de;
    padding-bottom: 0.3em;
}

code {
    font-family: "SF Mono", Menlo, Consolas, monospace;
    font-size: 85%;
    background: #f6f8fa;
    border-radius: 4px;
    padding: 0.2em 0.4em;
}

pre {
    background: #f6f8fa;
    border-radius: 6px;
    padding: 16px;
    overflow-x: auto;
}

pre code {
    background: none;
    padding: 0;
}

blockquote {
    border-left: 4px solid #d0d7de;
    color: #57606a;
    margin: 0;
    padding-left: 16px;
}

table {
    border-collapse: collapse;
    margin: 16px 0;
}

th, td {
    border: 1px solid #d0d7de;
    padding: 6px 13px;
}

th {
    background: #f6f8fa;
    font-weight: 600;
}

img { max-width: 100%; }

a { color: #0969da; }
"#;
