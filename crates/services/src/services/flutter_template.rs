//! Name-parameterized Flutter project skeleton and required-file completion.

use crate::services::file_set::FileRecord;

pub const MANIFEST_PATH: &str = "pubspec.yaml";
pub const ENTRY_POINT_PATH: &str = "lib/main.dart";
pub const README_PATH: &str = "README.md";

/// Paths every completed project is guaranteed to contain.
pub const REQUIRED_PATHS: [&str; 3] = [MANIFEST_PATH, ENTRY_POINT_PATH, README_PATH];

/// Derive the Dart package identifier from a display name: lowercase,
/// symbols become underscores, runs collapsed, edges trimmed.
pub fn package_name(app_name: &str) -> String {
    let mut name = String::with_capacity(app_name.len());
    for c in app_name.to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '_'
        };
        if c == '_' && name.ends_with('_') {
            continue;
        }
        name.push(c);
    }
    let trimmed = name.trim_matches('_');
    if trimmed.is_empty() {
        "app".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The canonical project skeleton for `app_name`. Pure and deterministic:
/// no I/O, no dependence on prior generations. Every path stays inside the
/// build service's allow-list.
pub fn project_template(app_name: &str) -> Vec<FileRecord> {
    let package = package_name(app_name);
    vec![
        FileRecord::new(MANIFEST_PATH, fallback_manifest(app_name)),
        FileRecord::new(ENTRY_POINT_PATH, main_dart(app_name)),
        FileRecord::new("lib/app.dart", app_dart(app_name)),
        FileRecord::new("lib/core/constants.dart", constants_dart(app_name)),
        FileRecord::new(README_PATH, fallback_readme(app_name)),
        FileRecord::new("analysis_options.yaml", ANALYSIS_OPTIONS.to_string()),
        FileRecord::new(".gitignore", GITIGNORE.to_string()),
        FileRecord::new(".metadata", METADATA.to_string()),
        FileRecord::new("test/widget_test.dart", widget_test_dart(&package)),
        FileRecord::new("web/index.html", web_index_html(app_name)),
        FileRecord::new("web/manifest.json", web_manifest(app_name)),
    ]
}

/// Guarantee the required paths exist, appending synthesized fallbacks for
/// any that are missing. Files the caller supplied are never removed or
/// altered, which also makes this idempotent.
pub fn validate_and_complete(mut files: Vec<FileRecord>, app_name: &str) -> Vec<FileRecord> {
    for required in REQUIRED_PATHS {
        if files.iter().any(|f| f.path == required) {
            continue;
        }
        let content = match required {
            MANIFEST_PATH => fallback_manifest(app_name),
            ENTRY_POINT_PATH => fallback_entry_point(app_name),
            _ => fallback_readme(app_name),
        };
        files.push(FileRecord::new(required, content));
    }
    files
}

/// The minimal static project used when generation produces nothing usable.
pub fn fallback_files(app_name: &str) -> Vec<FileRecord> {
    vec![
        FileRecord::new(MANIFEST_PATH, fallback_manifest(app_name)),
        FileRecord::new(ENTRY_POINT_PATH, fallback_entry_point(app_name)),
        FileRecord::new(README_PATH, fallback_readme(app_name)),
    ]
}

pub fn fallback_manifest(app_name: &str) -> String {
    format!(
        r#"name: {package}
description: A new Flutter project generated by Genius APPio.
publish_to: 'none'
version: 1.0.0+1

environment:
  sdk: '>=3.0.0 <4.0.0'

dependencies:
  flutter:
    sdk: flutter
  cupertino_icons: ^1.0.2

dev_dependencies:
  flutter_test:
    sdk: flutter
  flutter_lints: ^2.0.0

flutter:
  uses-material-design: true
"#,
        package = package_name(app_name)
    )
}

pub fn fallback_entry_point(app_name: &str) -> String {
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
      title: '{app_name}',
      theme: ThemeData(
        primarySwatch: Colors.blue,
        visualDensity: VisualDensity.adaptivePlatformDensity,
      ),
      home: const HomeScreen(),
    );
  }}
}}

class HomeScreen extends StatelessWidget {{
  const HomeScreen({{super.key}});

  @override
  Widget build(BuildContext context) {{
    return Scaffold(
      appBar: AppBar(
        title: const Text('{app_name}'),
      ),
      body: const Center(
        child: Column(
          mainAxisAlignment: MainAxisAlignment.center,
          children: [
            Icon(Icons.flutter_dash, size: 100, color: Colors.blue),
            SizedBox(height: 20),
            Text(
              'Welcome to {app_name}!',
              style: TextStyle(fontSize: 24, fontWeight: FontWeight.bold),
            ),
            SizedBox(height: 10),
            Text(
              'Generated by Genius APPio',
              style: TextStyle(fontSize: 16),
            ),
          ],
        ),
      ),
    );
  }}
}}
"#
    )
}

pub fn fallback_readme(app_name: &str) -> String {
    format!(
        r#"# {app_name}

A Flutter application generated by Genius APPio.

## Getting Started

1. Run `flutter pub get` to install dependencies
2. Run `flutter run -d chrome` to start the app

## Project Structure

- `web/` - Web platform files (index.html, manifest.json)
- `lib/` - Main Dart application code
- `test/` - Unit and widget tests

The app is optimized for web deployment and can be built for production
using `flutter build web`.
"#
    )
}

fn main_dart(app_name: &str) -> String {
    format!(
        r#"import 'package:flutter/material.dart';

import 'app.dart';

void main() {{
  runApp(const {class_name}App());
}}
"#,
        class_name = class_name(app_name)
    )
}

fn app_dart(app_name: &str) -> String {
    format!(
        r#"import 'package:flutter/material.dart';

import 'core/constants.dart';

class {class_name}App extends StatelessWidget {{
  const {class_name}App({{super.key}});

  @override
  Widget build(BuildContext context) {{
    return MaterialApp(
      title: AppConstants.appName,
      debugShowCheckedModeBanner: false,
      theme: ThemeData(
        useMaterial3: true,
        colorScheme: ColorScheme.fromSeed(seedColor: AppConstants.primaryColor),
      ),
      home: const HomeScreen(),
    );
  }}
}}

class HomeScreen extends StatelessWidget {{
  const HomeScreen({{super.key}});

  @override
  Widget build(BuildContext context) {{
    return Scaffold(
      appBar: AppBar(
        title: const Text(AppConstants.appName),
      ),
      body: const Center(
        child: Text(
          'Welcome to {app_name}!',
          style: TextStyle(fontSize: 24, fontWeight: FontWeight.bold),
        ),
      ),
    );
  }}
}}
"#,
        class_name = class_name(app_name)
    )
}

fn constants_dart(app_name: &str) -> String {
    format!(
        r#"import 'package:flutter/material.dart';

class AppConstants {{
  static const String appName = '{app_name}';
  static const Color primaryColor = Color(0xFF2196F3);
  static const double defaultPadding = 16.0;
}}
"#
    )
}

fn widget_test_dart(package: &str) -> String {
    format!(
        r#"import 'package:flutter/material.dart';
import 'package:flutter_test/flutter_test.dart';

import 'package:{package}/main.dart' as app;

void main() {{
  testWidgets('app renders a home screen', (WidgetTester tester) async {{
    app.main();
    await tester.pumpAndSettle();
    expect(find.byType(Scaffold), findsOneWidget);
  }});
}}
"#
    )
}

fn web_index_html(app_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <base href="$FLUTTER_BASE_HREF">
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta name="description" content="{app_name}">
  <link rel="manifest" href="manifest.json">
  <title>{app_name}</title>
</head>
<body>
  <script src="flutter_bootstrap.js" async></script>
</body>
</html>
"#
    )
}

fn web_manifest(app_name: &str) -> String {
    format!(
        r##"{{
  "name": "{app_name}",
  "short_name": "{app_name}",
  "start_url": ".",
  "display": "standalone",
  "background_color": "#FFFFFF",
  "theme_color": "#2196F3",
  "description": "{app_name}, generated by Genius APPio."
}}
"##
    )
}

/// UpperCamelCase Dart class prefix derived from the package name.
fn class_name(app_name: &str) -> String {
    package_name(app_name)
        .split('_')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

const ANALYSIS_OPTIONS: &str = r#"include: package:flutter_lints/flutter.yaml

linter:
  rules:
"#;

const GITIGNORE: &str = r#".dart_tool/
.packages
build/
.flutter-plugins
.flutter-plugins-dependencies
"#;

const METADATA: &str = r#"# This file tracks properties of this Flutter project.
# Used by Flutter tool to assess capabilities and perform upgrades etc.
version:
  channel: stable
project_type: app
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_name_normalization() {
        assert_eq!(package_name("Cat Tracker"), "cat_tracker");
        assert_eq!(package_name("My App!!"), "my_app");
        assert_eq!(package_name("my_awesome_app"), "my_awesome_app");
        assert_eq!(package_name("!!!"), "app");
    }

    #[test]
    fn template_is_pure() {
        assert_eq!(project_template("Cat Tracker"), project_template("Cat Tracker"));
    }

    #[test]
    fn template_paths_are_unique_and_allowed() {
        let files = project_template("Cat Tracker");
        let mut paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), files.len());

        for file in &files {
            let in_allowed_dir = ["lib/", "test/", "web/"]
                .iter()
                .any(|dir| file.path.starts_with(dir));
            let allowed_root = [
                "pubspec.yaml",
                "README.md",
                "analysis_options.yaml",
                ".gitignore",
                ".metadata",
            ]
            .contains(&file.path.as_str());
            assert!(in_allowed_dir || allowed_root, "unexpected path {}", file.path);
        }
    }

    #[test]
    fn template_substitutes_names() {
        let files = project_template("Cat Tracker");
        let pubspec = files.iter().find(|f| f.path == MANIFEST_PATH).unwrap();
        assert!(pubspec.content.contains("name: cat_tracker"));
        let constants = files
            .iter()
            .find(|f| f.path == "lib/core/constants.dart")
            .unwrap();
        assert!(constants.content.contains("Cat Tracker"));
    }

    #[test]
    fn complete_adds_all_required_paths() {
        let completed = validate_and_complete(vec![], "Cat Tracker");
        for required in REQUIRED_PATHS {
            assert!(completed.iter().any(|f| f.path == required));
        }
        let entry = completed
            .iter()
            .find(|f| f.path == ENTRY_POINT_PATH)
            .unwrap();
        assert!(entry.content.contains("Cat Tracker"));
    }

    #[test]
    fn complete_never_alters_supplied_files() {
        let supplied = vec![FileRecord::new(MANIFEST_PATH, "name: custom")];
        let completed = validate_and_complete(supplied, "Cat Tracker");
        let manifest = completed.iter().find(|f| f.path == MANIFEST_PATH).unwrap();
        assert_eq!(manifest.content, "name: custom");
    }

    #[test]
    fn complete_is_idempotent() {
        let once = validate_and_complete(fallback_files("Cat Tracker"), "Cat Tracker");
        let twice = validate_and_complete(once.clone(), "Cat Tracker");
        assert_eq!(once, twice);
    }
}
