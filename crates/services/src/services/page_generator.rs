//! Single-page generation: one Flutter screen plus its pubspec and widget
//! tree, with per-field fallbacks when the model reply is unusable.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use super::gemini::{GeminiClient, GeminiError};

static DART_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```dart\s*(.*?)```").expect("valid regex"));
static YAML_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```ya?ml\s*(.*?)```").expect("valid regex"));
static ANY_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\w*\s*(.*?)```").expect("valid regex"));

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PageGenerationRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub project_context: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPage {
    pub code: String,
    pub pubspec_yaml: String,
    pub widget_structure: String,
}

/// Model reply shape; every field optional so partial replies still count.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageReply {
    code: Option<String>,
    pubspec_yaml: Option<String>,
    widget_structure: Option<String>,
}

/// Generates a single Flutter page from a name and description.
pub struct PageGenerator {
    client: GeminiClient,
}

impl PageGenerator {
    pub fn from_env() -> Result<Self, GeminiError> {
        Ok(Self {
            client: GeminiClient::from_env()?,
        })
    }

    pub fn with_client(client: GeminiClient) -> Self {
        Self { client }
    }

    /// Generate the page. Invocation errors propagate; an unparseable or
    /// partial reply is patched field-by-field with static fallbacks.
    pub async fn generate_page(
        &self,
        request: &PageGenerationRequest,
    ) -> Result<GeneratedPage, GeminiError> {
        let raw = self
            .client
            .ask(&page_prompt(request), Some(PAGE_SYSTEM_PROMPT.to_string()))
            .await
            .inspect_err(|e| warn!(page = %request.name, error = %e, "Page generation call failed"))?;

        Ok(assemble_page(&raw, request))
    }
}

/// Turn the raw reply into a complete page: strict JSON first, then code
/// fences, then static fallbacks for whatever is still missing.
fn assemble_page(raw: &str, request: &PageGenerationRequest) -> GeneratedPage {
    let reply = serde_json::from_str::<PageReply>(super::gemini::extract_json(raw))
        .unwrap_or_else(|e| {
            debug!(error = %e, "Page reply is not JSON, extracting code fences");
            PageReply {
                code: DART_FENCE_RE
                    .captures(raw)
                    .map(|c| c[1].trim().to_string()),
                pubspec_yaml: YAML_FENCE_RE
                    .captures(raw)
                    .or_else(|| ANY_FENCE_RE.captures(raw))
                    .map(|c| c[1].trim().to_string()),
                widget_structure: None,
            }
        });

    GeneratedPage {
        code: reply
            .code
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| fallback_page_code(&request.name, &request.description)),
        pubspec_yaml: reply
            .pubspec_yaml
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| fallback_page_pubspec(&request.name)),
        widget_structure: reply
            .widget_structure
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| fallback_widget_structure()),
    }
}

const PAGE_SYSTEM_PROMPT: &str = "You are an expert Flutter UI engineer. \
You generate visually polished, production-ready Material 3 pages. \
Output valid JSON only.";

fn page_prompt(request: &PageGenerationRequest) -> String {
    let context = request
        .project_context
        .as_deref()
        .map(|c| format!("\nProject Context: {c}"))
        .unwrap_or_default();
    format!(
        r#"Generate a professional, beautiful Flutter page in Dart that matches a
modern design tool's output quality: Material 3, smooth animations, a
responsive layout and a cheerful, accessible color scheme.

Page Name: {name}
Description: {description}{context}

Requirements:
- A complete, runnable app: imports, main() and a Scaffold with an AppBar.
- Use a StatefulWidget with animation controllers for fade and scale
  transitions; dispose them properly.
- Use Material 3 components (Card, FilledButton), proper spacing tokens
  (16.0, 24.0, 32.0) and const constructors.
- No placeholder comments; every widget must be fully implemented.

Return a JSON object with exactly these fields:
- "code": the complete lib/main.dart
- "pubspecYaml": a complete pubspec.yaml with all required dependencies
- "widgetStructure": a hierarchical widget tree outline
"#,
        name = request.name,
        description = request.description,
    )
}

fn page_class_name(name: &str) -> String {
    let compact: String = name.split_whitespace().collect();
    format!("{compact}Page")
}

pub fn fallback_page_code(name: &str, description: &str) -> String {
    let class_name = page_class_name(name);
    format!(
        r#"import 'package:flutter/material.dart';

void main() {{
  runApp(const MyApp());
}}

class MyApp extends StatelessWidget {{
  const MyApp({{super.key}});

  @override
  Widget build(BuildContext context) {{
    return MaterialApp(
      title: '{name}',
      theme: ThemeData(
        useMaterial3: true,
        colorScheme: ColorScheme.fromSeed(
          seedColor: const Color(0xFF6750A4),
          brightness: Brightness.light,
        ),
      ),
      debugShowCheckedModeBanner: false,
      home: const {class_name}(),
    );
  }}
}}

class {class_name} extends StatefulWidget {{
  const {class_name}({{super.key}});

  @override
  State<{class_name}> createState() => _{class_name}State();
}}

class _{class_name}State extends State<{class_name}>
    with TickerProviderStateMixin {{
  late final AnimationController _fadeController = AnimationController(
    duration: const Duration(milliseconds: 1000),
    vsync: this,
  );
  late final Animation<double> _fadeAnimation = CurvedAnimation(
    parent: _fadeController,
    curve: Curves.easeInOut,
  );

  @override
  void initState() {{
    super.initState();
    _fadeController.forward();
  }}

  @override
  void dispose() {{
    _fadeController.dispose();
    super.dispose();
  }}

  @override
  Widget build(BuildContext context) {{
    return Scaffold(
      body: Container(
        decoration: const BoxDecoration(
          gradient: LinearGradient(
            begin: Alignment.topLeft,
            end: Alignment.bottomRight,
            colors: [Color(0xFF667EEA), Color(0xFF764BA2)],
          ),
        ),
        child: SafeArea(
          child: FadeTransition(
            opacity: _fadeAnimation,
            child: Center(
              child: Padding(
                padding: const EdgeInsets.all(32.0),
                child: Card(
                  shape: RoundedRectangleBorder(
                    borderRadius: BorderRadius.circular(24.0),
                  ),
                  elevation: 8,
                  child: Padding(
                    padding: const EdgeInsets.all(24.0),
                    child: Column(
                      mainAxisSize: MainAxisSize.min,
                      children: [
                        const Icon(
                          Icons.auto_awesome,
                          size: 48,
                          color: Color(0xFF667EEA),
                        ),
                        const SizedBox(height: 24),
                        Text(
                          '{name}',
                          style: Theme.of(context).textTheme.headlineMedium,
                          textAlign: TextAlign.center,
                        ),
                        const SizedBox(height: 16),
                        Text(
                          '{description}',
                          style: Theme.of(context).textTheme.bodyLarge,
                          textAlign: TextAlign.center,
                        ),
                        const SizedBox(height: 32),
                        FilledButton(
                          onPressed: () {{
                            ScaffoldMessenger.of(context).showSnackBar(
                              SnackBar(
                                content: Text('Welcome to {name}!'),
                                behavior: SnackBarBehavior.floating,
                              ),
                            );
                          }},
                          child: const Text('Get Started'),
                        ),
                      ],
                    ),
                  ),
                ),
              ),
            ),
          ),
        ),
      ),
    );
  }}
}}
"#
    )
}

pub fn fallback_page_pubspec(name: &str) -> String {
    let package: String = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!(
        r#"name: {package}
description: A professional Flutter application for {name}

publish_to: 'none'

version: 1.0.0+1

environment:
  sdk: '>=3.0.0 <4.0.0'
  flutter: ">=3.10.0"

dependencies:
  flutter:
    sdk: flutter
  cupertino_icons: ^1.0.6
  google_fonts: ^6.1.0

dev_dependencies:
  flutter_test:
    sdk: flutter
  flutter_lints: ^3.0.1

flutter:
  uses-material-design: true
"#
    )
}

fn fallback_widget_structure() -> String {
    r#"MaterialApp
├── Scaffold
│   └── SafeArea
│       └── Center
│           └── Card
│               └── Column
│                   ├── Icon
│                   ├── Text
│                   ├── Text
│                   └── FilledButton"#
        .to_string()
}
