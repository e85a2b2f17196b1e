//! End-to-end tests over real files: load a backend config, synthesize, save,
//! and update function templates.

use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;

use fnchain_core::config::TemplateConfig;
use fnchain_core::store::BackendConfig;
use fnchain_core::synth::{SynthesisOptions, synthesize};
use fnchain_core::templates::{TemplateLayout, TemplateReport, update_templates};

const BACKEND: &str = r#"{
  "auth": { "userPool": { "service": "Cognito" } },
  "function": {
    "F1": { "build": true, "service": "Lambda" },
    "F2": { "build": true, "service": "Lambda" },
    "F3": { "build": true, "service": "Lambda" }
  }
}"#;

fn template_for(root: &Path, name: &str, body: &Value) {
    let dir = root.join("function").join(name);
    fs::create_dir_all(&dir).expect("create function dir");
    fs::write(
        dir.join(format!("{name}-cloudformation-template.json")),
        serde_json::to_string_pretty(body).expect("encode"),
    )
    .expect("write template");
}

fn read_template(root: &Path, name: &str) -> Value {
    let path = root
        .join("function")
        .join(name)
        .join(format!("{name}-cloudformation-template.json"));
    serde_json::from_str(&fs::read_to_string(path).expect("read template")).expect("json")
}

fn base_template() -> Value {
    json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Parameters": { "env": { "Type": "String" } },
        "Resources": {}
    })
}

#[test]
fn serialize_then_update_templates() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    let config_path = root.join("backend-config.json");
    fs::write(&config_path, BACKEND).expect("write backend");
    for name in ["F1", "F2", "F3"] {
        template_for(root, name, &base_template());
    }

    let mut config = BackendConfig::load(&config_path).expect("load");
    let result = synthesize(config.functions(), &SynthesisOptions::default()).expect("acyclic");
    config.replace_functions(result.functions.clone());
    config.save(&config_path).expect("save");

    let written: Value =
        serde_json::from_str(&fs::read_to_string(&config_path).expect("read")).expect("json");
    assert_eq!(written["auth"]["userPool"]["service"], "Cognito");
    assert_eq!(
        written["function"]["F1"]["dependsOn"][0]["resourceName"],
        "F2"
    );
    assert_eq!(
        written["function"]["F2"]["dependsOn"][0]["resourceName"],
        "F3"
    );
    assert!(written["function"]["F3"].get("dependsOn").is_none());

    let layout = TemplateLayout::new(root, &TemplateConfig::default());
    let report = update_templates(&layout, &result.functions).expect("update");
    assert_eq!(
        report,
        TemplateReport::Updated {
            templates: 2,
            parameters_added: 2,
        }
    );

    let f1 = read_template(root, "F1");
    assert_eq!(f1["Parameters"]["env"], json!({ "Type": "String" }));
    assert_eq!(
        f1["Parameters"]["functionF2Name"],
        json!({
            "Type": "String",
            "Description": "Parameter for function F1",
            "Default": "functionF2Name",
        })
    );
    assert!(read_template(root, "F3")["Parameters"].get("functionF1Name").is_none());
}

#[test]
fn missing_template_blocks_every_update() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    template_for(root, "F1", &base_template());
    template_for(root, "F3", &base_template());

    let config = BackendConfig::parse(BACKEND).expect("parse");
    let result = synthesize(config.functions(), &SynthesisOptions::default()).expect("acyclic");

    let layout = TemplateLayout::new(root, &TemplateConfig::default());
    let report = update_templates(&layout, &result.functions).expect("update");
    assert_eq!(
        report,
        TemplateReport::Missing {
            functions: vec!["F2".to_string()],
        }
    );
    assert_eq!(read_template(root, "F1"), base_template());
    assert_eq!(read_template(root, "F3"), base_template());
}

#[test]
fn existing_parameters_are_left_alone() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    let mut f1 = base_template();
    f1["Parameters"]["functionF2Name"] = json!({ "Type": "String", "Default": "custom" });
    template_for(root, "F1", &f1);
    template_for(root, "F2", &base_template());
    template_for(root, "F3", &base_template());

    let config = BackendConfig::parse(BACKEND).expect("parse");
    let result = synthesize(config.functions(), &SynthesisOptions::default()).expect("acyclic");

    let layout = TemplateLayout::new(root, &TemplateConfig::default());
    let report = update_templates(&layout, &result.functions).expect("update");
    assert_eq!(
        report,
        TemplateReport::Updated {
            templates: 1,
            parameters_added: 1,
        }
    );
    assert_eq!(read_template(root, "F1"), f1);
}

#[test]
fn template_without_parameters_gets_the_section() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    template_for(root, "F1", &json!({ "Resources": {} }));
    template_for(root, "F2", &json!({ "Resources": {} }));
    template_for(root, "F3", &json!({ "Resources": {} }));

    let config = BackendConfig::parse(BACKEND).expect("parse");
    let result = synthesize(config.functions(), &SynthesisOptions::default()).expect("acyclic");

    let layout = TemplateLayout::new(root, &TemplateConfig::default());
    update_templates(&layout, &result.functions).expect("update");
    let f2 = read_template(root, "F2");
    assert_eq!(f2["Parameters"]["functionF3Name"]["Default"], "functionF3Name");
}

#[test]
fn layout_picks_first_matching_file_by_name() {
    let dir = TempDir::new().expect("tempdir");
    let fn_dir = dir.path().join("function").join("F1");
    fs::create_dir_all(&fn_dir).expect("mkdir");
    fs::write(fn_dir.join("b-cloudformation-template.json"), "{}").expect("write");
    fs::write(fn_dir.join("a-cloudformation-template.json"), "{}").expect("write");
    fs::write(fn_dir.join("parameters.json"), "{}").expect("write");

    let layout = TemplateLayout::new(dir.path(), &TemplateConfig::default());
    let found = layout.locate("F1").expect("template");
    assert_eq!(
        found.file_name().and_then(|n| n.to_str()),
        Some("a-cloudformation-template.json")
    );
    assert!(layout.locate("F2").is_none());
}

#[cfg(unix)]
#[test]
fn layout_follows_symlinked_templates() {
    let dir = TempDir::new().expect("tempdir");
    let shared = dir.path().join("shared");
    fs::create_dir_all(&shared).expect("mkdir");
    let target = shared.join("F1-cloudformation-template.json");
    fs::write(&target, r#"{ "Parameters": {} }"#).expect("write");

    let fn_dir = dir.path().join("function").join("F1");
    fs::create_dir_all(&fn_dir).expect("mkdir");
    let link = fn_dir.join("F1-cloudformation-template.json");
    std::os::unix::fs::symlink(&target, &link).expect("symlink");
    fs::create_dir_all(fn_dir.join("A-cloudformation-template.json")).expect("mkdir");

    let layout = TemplateLayout::new(dir.path(), &TemplateConfig::default());
    assert_eq!(layout.locate("F1"), Some(link));
}
