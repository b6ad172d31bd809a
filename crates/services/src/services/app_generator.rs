//! Prompt-to-file-set generation pipeline: prompt assembly, model
//! invocation, response parsing, fallback substitution, merge and
//! completion.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use ts_rs::TS;

use super::file_set::{FileRecord, merge_project_files};
use super::flutter_template::{fallback_files, project_template, validate_and_complete};
use super::gemini::{GeminiClient, GeminiError, GenerationConfig, extract_json};

const DEFAULT_APP_NAME: &str = "my_awesome_app";

static APP_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)App Name:\s*"([^"]+)""#).expect("valid regex"));

/// Structured plan from the wizard UI; rendered into the free-text prompt
/// shape the pipeline consumes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AppPlan {
    pub app_name: String,
    pub description: String,
    #[serde(default)]
    pub pages: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub backend: Option<String>,
}

impl AppPlan {
    pub fn to_prompt(&self) -> String {
        let mut prompt = format!(
            "App Name: \"{}\"\nDescription: {}",
            self.app_name, self.description
        );
        if let Some(backend) = &self.backend {
            prompt.push_str(&format!("\nBackend: {backend}"));
        }
        if !self.pages.is_empty() {
            prompt.push_str(&format!("\nPages: {}", self.pages.join(", ")));
        }
        if !self.features.is_empty() {
            prompt.push_str(&format!("\nFeatures: {}", self.features.join(", ")));
        }
        if !self.colors.is_empty() {
            prompt.push_str(&format!("\nColors: {}", self.colors.join(", ")));
        }
        prompt
    }
}

/// Result of one generation run. `files` is always a complete, buildable
/// project; `used_fallback` records whether the static fallback stood in for
/// the model output.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedApp {
    pub files: Vec<FileRecord>,
    pub app_name: String,
    pub used_fallback: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedFileSet {
    files: Vec<FileRecord>,
}

/// Generates a complete Flutter project from a natural-language prompt.
pub struct AppGenerator {
    client: GeminiClient,
}

impl AppGenerator {
    pub fn from_env() -> Result<Self, GeminiError> {
        Ok(Self {
            client: GeminiClient::from_env()?,
        })
    }

    pub fn with_client(client: GeminiClient) -> Self {
        Self { client }
    }

    /// Run the full pipeline. This cannot fail: when the model call errors
    /// or returns nothing parseable, the static fallback project is
    /// substituted, so the returned file set is always non-empty and
    /// contains the required skeleton files.
    pub async fn generate_app(&self, prompt: &str) -> GeneratedApp {
        let app_name = extract_app_name(prompt);
        let template = project_template(&app_name);

        let raw = match self
            .client
            .generate(
                &generation_prompt(prompt),
                Some(GENERATION_SYSTEM_PROMPT.to_string()),
                Some(GenerationConfig {
                    response_mime_type: Some("application/json".to_string()),
                    response_schema: Some(files_schema()),
                    temperature: None,
                }),
            )
            .await
        {
            Ok(response) => response.text().map(|s| s.to_string()),
            Err(e) => {
                warn!(error = %e, "App generation call failed, using fallback project");
                None
            }
        };

        let parsed = raw.as_deref().and_then(parse_generated_files);
        let (generated, used_fallback) = match parsed {
            Some((files, strategy)) => {
                info!(
                    app_name = %app_name,
                    file_count = files.len(),
                    strategy = strategy,
                    "Parsed generated project files"
                );
                (files, false)
            }
            None => {
                warn!(app_name = %app_name, "No usable model output, using fallback project");
                (fallback_files(&app_name), true)
            }
        };

        let merged = merge_project_files(template, generated);
        let files = validate_and_complete(merged, &app_name);

        GeneratedApp {
            files,
            app_name,
            used_fallback,
        }
    }
}

/// Pull the quoted app name out of the prompt, falling back to a default.
pub fn extract_app_name(prompt: &str) -> String {
    APP_NAME_RE
        .captures(prompt)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_APP_NAME.to_string())
}

/// Ordered chain of parsing strategies over the raw model reply. Each
/// strategy either yields a non-empty file list or passes to the next;
/// `None` means the caller should substitute the fallback project.
fn parse_generated_files(raw: &str) -> Option<(Vec<FileRecord>, &'static str)> {
    const STRATEGIES: [(&str, fn(&str) -> Option<Vec<FileRecord>>); 2] = [
        ("strict-json", parse_strict),
        ("code-fence", parse_code_fence),
    ];

    for (name, parse) in STRATEGIES {
        match parse(raw) {
            Some(files) if !files.is_empty() => return Some((files, name)),
            _ => debug!(strategy = name, "Parse strategy produced no files"),
        }
    }
    None
}

fn parse_strict(raw: &str) -> Option<Vec<FileRecord>> {
    serde_json::from_str::<GeneratedFileSet>(raw)
        .map(|set| set.files)
        .or_else(|_| serde_json::from_str::<Vec<FileRecord>>(raw))
        .ok()
}

fn parse_code_fence(raw: &str) -> Option<Vec<FileRecord>> {
    parse_strict(extract_json(raw))
}

fn files_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "files": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "path": {"type": "string"},
                        "content": {"type": "string"}
                    },
                    "required": ["path", "content"]
                }
            }
        },
        "required": ["files"]
    })
}

const GENERATION_SYSTEM_PROMPT: &str = "You are an expert Flutter app generator. \
You produce complete, organized Flutter projects from user specifications. \
Output valid JSON only.";

fn generation_prompt(user_prompt: &str) -> String {
    format!(
        r#"Generate a complete, organized Flutter project based on the user's specifications.

## User Requirements
"{user_prompt}"

## Instructions

1. Extract the App Name, Backend type, Description, Pages, Features, and Colors
   from the requirements and use them to create a cohesive, well-structured app.
   Convert the app name to snake_case for the package name.

2. Write clean, organized Dart code with correct imports, class definitions and
   structure. Every file must be complete and functional - never write
   placeholders such as "// Add your code here".

3. Generate these files:
   - pubspec.yaml: package name from the prompt, relevant dependencies
   - lib/main.dart: app entry point with proper routing
   - lib/app.dart: MaterialApp configuration with a theme based on the specified colors
   - lib/screens/: one .dart file per page mentioned in the requirements
   - lib/widgets/: reusable widgets if needed
   - lib/models/: data models based on the app functionality
   - lib/services/: service files for the specified backend type
   - lib/core/constants.dart: app constants and colors
   - README.md: project documentation

4. Each screen must be a complete StatelessWidget or StatefulWidget with a
   proper AppBar, body and navigation, using the app's color scheme.

5. A complete Flutter project skeleton is provided automatically and your
   files are merged over it, so generate only Dart code and configuration.

## Output
Return a JSON object with a "files" array; each entry has "path" and "content".
"#
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::services::flutter_template::REQUIRED_PATHS;

    #[test]
    fn extracts_quoted_app_name() {
        assert_eq!(
            extract_app_name(r#"App Name: "Cat Tracker", blue theme"#),
            "Cat Tracker"
        );
        assert_eq!(
            extract_app_name(r#"app name: "lower case" rest"#),
            "lower case"
        );
        assert_eq!(extract_app_name("no name here"), DEFAULT_APP_NAME);
    }

    #[test]
    fn plan_renders_to_prompt() {
        let plan = AppPlan {
            app_name: "Cat Tracker".to_string(),
            description: "Track cats".to_string(),
            pages: vec!["Home".to_string(), "Settings".to_string()],
            features: vec![],
            colors: vec!["blue".to_string()],
            backend: Some("firebase".to_string()),
        };
        let prompt = plan.to_prompt();
        assert!(prompt.contains(r#"App Name: "Cat Tracker""#));
        assert!(prompt.contains("Pages: Home, Settings"));
        assert!(prompt.contains("Backend: firebase"));
        assert!(!prompt.contains("Features:"));
    }

    #[test]
    fn parse_chain_handles_object_array_and_fence() {
        let object = r#"{"files": [{"path": "lib/main.dart", "content": "x"}]}"#;
        let (files, strategy) = parse_generated_files(object).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(strategy, "strict-json");

        let array = r#"[{"path": "lib/main.dart", "content": "x"}]"#;
        assert!(parse_generated_files(array).is_some());

        let fenced = "Here you go:\n```json\n{\"files\": [{\"path\": \"a\", \"content\": \"b\"}]}\n```";
        let (_, strategy) = parse_generated_files(fenced).unwrap();
        assert_eq!(strategy, "code-fence");
    }

    #[test]
    fn parse_chain_rejects_garbage_and_empty() {
        assert!(parse_generated_files("not json at all").is_none());
        assert!(parse_generated_files(r#"{"files": []}"#).is_none());
    }

    async fn generator_against(server: &MockServer) -> AppGenerator {
        let client = GeminiClient::new("test-key".to_string(), None)
            .unwrap()
            .with_base_url(server.uri());
        AppGenerator::with_client(client)
    }

    #[tokio::test]
    async fn model_failure_yields_fallback_project() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let generator = generator_against(&server).await;
        let result = generator
            .generate_app(r#"App Name: "Cat Tracker", blue theme, Home and Settings pages"#)
            .await;

        assert!(result.used_fallback);
        assert_eq!(result.app_name, "Cat Tracker");
        for required in REQUIRED_PATHS {
            assert!(result.files.iter().any(|f| f.path == required));
        }
        let main = result
            .files
            .iter()
            .find(|f| f.path == "lib/main.dart")
            .unwrap();
        assert!(main.content.contains("Cat Tracker"));
        let pubspec = result
            .files
            .iter()
            .find(|f| f.path == "pubspec.yaml")
            .unwrap();
        assert!(pubspec.content.contains("cat_tracker"));
    }

    #[tokio::test]
    async fn model_output_overrides_template() {
        let server = MockServer::start().await;
        let reply = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text":
                    "{\"files\": [{\"path\": \"lib/main.dart\", \"content\": \"// Cat Tracker entry\"}]}"
                }]},
                "finishReason": "STOP"
            }]
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply))
            .mount(&server)
            .await;

        let generator = generator_against(&server).await;
        let result = generator
            .generate_app(r#"App Name: "Cat Tracker""#)
            .await;

        assert!(!result.used_fallback);
        let main = result
            .files
            .iter()
            .find(|f| f.path == "lib/main.dart")
            .unwrap();
        assert_eq!(main.content, "// Cat Tracker entry");
        // template files the model did not touch are still present
        assert!(result.files.iter().any(|f| f.path == "analysis_options.yaml"));
        assert!(result.files.iter().any(|f| f.path == "web/index.html"));
    }
}
