//! Synthesized static HTML preview, published when the Flutter toolchain is
//! unavailable or the build fails.

use std::sync::LazyLock;

use regex::Regex;

use super::file_set::FileRecord;
use super::flutter_template::{ENTRY_POINT_PATH, MANIFEST_PATH};

/// Stable marker distinguishing a synthesized preview from a real build.
pub const PREVIEW_MARKER: &str = r#"<meta name="generator" content="appio-html-preview">"#;

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Colors\.(\w+)").expect("valid regex"));
static DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"description:\s*(.+)").expect("valid regex"));

const DEFAULT_COLOR: &str = "#2196F3";
const DEFAULT_DESCRIPTION: &str = "Flutter app generated by Genius APPio";

pub fn is_html_preview(html: &str) -> bool {
    html.contains(PREVIEW_MARKER)
}

fn primary_color(files: &[FileRecord]) -> &'static str {
    let main_dart = files.iter().find(|f| f.path == ENTRY_POINT_PATH);
    let color_name = main_dart
        .and_then(|f| COLOR_RE.captures(&f.content))
        .map(|caps| caps[1].to_string());

    match color_name.as_deref() {
        Some("blue") => "#2196F3",
        Some("red") => "#F44336",
        Some("green") => "#4CAF50",
        Some("purple") => "#9C27B0",
        Some("orange") => "#FF9800",
        Some("teal") => "#009688",
        _ => DEFAULT_COLOR,
    }
}

fn description(files: &[FileRecord]) -> String {
    files
        .iter()
        .find(|f| f.path == MANIFEST_PATH)
        .and_then(|f| DESCRIPTION_RE.captures(&f.content))
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string())
}

/// Render a phone-mockup preview page for the given file set. Pure function;
/// the primary color and description are scraped from the project files.
pub fn generate_html_preview(files: &[FileRecord], app_name: &str) -> String {
    let color = primary_color(files);
    let description = description(files);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    {PREVIEW_MARKER}
    <title>{app_name}</title>
    <style>
        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}

        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: linear-gradient(135deg, {color}15 0%, {color}05 100%);
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
        }}

        .app-container {{
            width: 375px;
            height: 667px;
            background: white;
            border-radius: 20px;
            box-shadow: 0 20px 40px rgba(0,0,0,0.1);
            overflow: hidden;
            position: relative;
        }}

        .app-header {{
            background: {color};
            color: white;
            padding: 20px;
            text-align: center;
        }}

        .app-title {{
            font-size: 24px;
            font-weight: bold;
            margin-top: 10px;
        }}

        .app-content {{
            padding: 30px 20px;
            text-align: center;
            height: calc(100% - 100px);
            display: flex;
            flex-direction: column;
            justify-content: center;
            align-items: center;
        }}

        .app-logo {{
            width: 80px;
            height: 80px;
            margin-bottom: 20px;
            border-radius: 50%;
            background: {color};
            display: flex;
            align-items: center;
            justify-content: center;
            font-size: 40px;
            color: white;
        }}

        .app-description {{
            color: #666;
            line-height: 1.6;
            margin-bottom: 30px;
        }}

        .feature-list {{
            list-style: none;
            text-align: left;
        }}

        .feature-list li {{
            padding: 10px 0;
            border-bottom: 1px solid #eee;
            color: #333;
        }}

        .feature-list li:before {{
            content: '\2713';
            color: {color};
            font-weight: bold;
            margin-right: 10px;
        }}

        .powered-by {{
            position: absolute;
            bottom: 10px;
            left: 0;
            right: 0;
            text-align: center;
            font-size: 12px;
            color: #999;
        }}

        .info-container {{
            position: absolute;
            top: 20px;
            left: 20px;
            background: white;
            padding: 20px;
            border-radius: 10px;
            box-shadow: 0 5px 15px rgba(0,0,0,0.1);
            max-width: 300px;
        }}

        .info-title {{
            font-size: 18px;
            font-weight: bold;
            color: {color};
            margin-bottom: 10px;
        }}

        .code-snippet {{
            background: #f8f9fa;
            border-radius: 5px;
            padding: 10px;
            font-family: 'Courier New', monospace;
            font-size: 12px;
            margin-top: 10px;
            border-left: 3px solid {color};
        }}
    </style>
</head>
<body>
    <div class="info-container">
        <div class="info-title">Project preview</div>
        <p>This is a static preview. To run the full application, use:</p>
        <div class="code-snippet">
            flutter pub get<br>
            flutter run -d chrome
        </div>
        <p style="margin-top: 10px; font-size: 12px; color: #666;">
            Created with Genius APPio
        </p>
    </div>

    <div class="app-container">
        <div class="app-header">
            <div class="app-title">{app_name}</div>
        </div>

        <div class="app-content">
            <div class="app-logo">&#128241;</div>
            <h2 style="color: {color}; margin-bottom: 15px;">Welcome to your app!</h2>
            <p class="app-description">{description}</p>

            <ul class="feature-list">
                <li>Modern user interface</li>
                <li>Responsive layout</li>
                <li>Runs in any browser</li>
                <li>High performance</li>
            </ul>
        </div>

        <div class="powered-by">
            Powered by Flutter &amp; Genius APPio
        </div>
    </div>
</body>
</html>"#
    )
}
