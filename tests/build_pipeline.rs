use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stylepipe::config::load_and_validate;
use stylepipe::errors::BuildError;
use stylepipe::pipeline::{run_build, BuildContext, BuildReport, ReloadHook};

type TestResult = Result<(), Box<dyn Error>>;

const BASE_CONFIG: &str = r#"
[source]
pattern = "src/less/*.less"

[output]
file = "index.css"
dir = "out"
"#;

fn write_project(dir: &Path, config: &str, files: &[(&str, &str)]) -> TestResult {
    fs::write(dir.join("stylepipe.toml"), config)?;
    fs::create_dir_all(dir.join("src/less"))?;
    for (name, contents) in files {
        fs::write(dir.join("src/less").join(name), contents)?;
    }
    Ok(())
}

fn context(dir: &Path) -> Result<BuildContext, BuildError> {
    let cfg = load_and_validate(dir.join("stylepipe.toml"))?;
    BuildContext::new(dir, cfg)
}

async fn build(dir: &Path) -> Result<BuildReport, BuildError> {
    run_build(&context(dir)?).await
}

fn output(dir: &Path) -> PathBuf {
    dir.join("out/index.css")
}

#[tokio::test]
async fn concatenation_preserves_lexical_source_order() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_project(
        dir.path(),
        BASE_CONFIG,
        &[("a.less", ".a{color:red}"), ("b.less", ".b{color:blue}")],
    )?;

    let report = build(dir.path()).await?;
    assert_eq!(report.source_count, 2);

    let css = fs::read_to_string(output(dir.path()))?;
    let a = css.find(".a {").expect("missing .a rule");
    let b = css.find(".b {").expect("missing .b rule");
    assert!(a < b, "rule order does not follow source order:\n{css}");
    Ok(())
}

#[tokio::test]
async fn repeated_builds_produce_byte_identical_output() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_project(
        dir.path(),
        BASE_CONFIG,
        &[("a.less", "@c: red;\n.a { color: @c; }")],
    )?;

    build(dir.path()).await?;
    let first = fs::read(output(dir.path()))?;
    let first_map = fs::read(dir.path().join("out/index.css.map"))?;

    build(dir.path()).await?;
    assert_eq!(first, fs::read(output(dir.path()))?);
    assert_eq!(first_map, fs::read(dir.path().join("out/index.css.map"))?);
    Ok(())
}

#[tokio::test]
async fn flex_display_is_prefixed_within_the_same_rule_block() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_project(dir.path(), BASE_CONFIG, &[("a.less", ".box { display: flex; }")])?;

    build(dir.path()).await?;
    let css = fs::read_to_string(output(dir.path()))?;

    let start = css.find(".box {").expect("missing .box rule");
    let end = start + css[start..].find('}').expect("unclosed block");
    let block = &css[start..end];

    let webkit = block.find("display: -webkit-flex;").expect("missing -webkit-flex");
    let ms = block.find("display: -ms-flexbox;").expect("missing -ms-flexbox");
    let plain = block.find("display: flex;").expect("missing unprefixed flex");
    assert!(webkit < plain && ms < plain, "prefixed variants must precede the original:\n{block}");
    Ok(())
}

#[tokio::test]
async fn compile_error_reports_location_and_writes_nothing() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_project(
        dir.path(),
        BASE_CONFIG,
        &[("a.less", ".a {\n  color: @missing;\n}")],
    )?;

    let err = build(dir.path()).await.unwrap_err();
    match err {
        BuildError::Compile { file, line, .. } => {
            assert_eq!(file, "src/less/a.less");
            assert_eq!(line, 2);
        }
        other => panic!("expected compile error, got {other}"),
    }
    assert!(!output(dir.path()).exists(), "failed build must not write an artifact");
    Ok(())
}

#[tokio::test]
async fn failed_build_keeps_the_previous_good_artifact() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_project(dir.path(), BASE_CONFIG, &[("a.less", ".a{color:red}")])?;

    build(dir.path()).await?;
    let good_css = fs::read(output(dir.path()))?;
    let good_map = fs::read(dir.path().join("out/index.css.map"))?;

    fs::write(dir.path().join("src/less/broken.less"), ".b {")?;
    let err = build(dir.path()).await.unwrap_err();
    assert!(matches!(err, BuildError::Compile { .. }));

    assert_eq!(good_css, fs::read(output(dir.path()))?);
    assert_eq!(good_map, fs::read(dir.path().join("out/index.css.map"))?);
    Ok(())
}

#[tokio::test]
async fn empty_source_set_produces_an_empty_stylesheet() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_project(dir.path(), BASE_CONFIG, &[])?;

    let report = build(dir.path()).await?;
    assert_eq!(report.source_count, 0);

    let css = fs::read_to_string(output(dir.path()))?;
    assert_eq!(css, "/*# sourceMappingURL=index.css.map */\n");

    let map: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/index.css.map"))?)?;
    assert_eq!(map["sources"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn whitespace_is_preserved_while_minify_is_disabled() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_project(dir.path(), BASE_CONFIG, &[("a.less", ".a { color: red; }")])?;

    build(dir.path()).await?;
    let css = fs::read_to_string(output(dir.path()))?;
    assert!(css.contains(".a {\n  color: red;\n}\n"), "expected pretty output:\n{css}");
    Ok(())
}

#[tokio::test]
async fn minify_step_collapses_output_when_enabled() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = format!("{BASE_CONFIG}\n[steps]\nminify = true\n");
    write_project(dir.path(), &config, &[("a.less", ".a { color: red; }")])?;

    build(dir.path()).await?;
    let css = fs::read_to_string(output(dir.path()))?;
    assert!(css.starts_with(".a {color: red;}"), "expected minified output:\n{css}");
    assert!(!css.contains("\n  "), "indentation should be stripped:\n{css}");
    Ok(())
}

#[tokio::test]
async fn source_map_lists_sources_in_order_with_contents() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_project(
        dir.path(),
        BASE_CONFIG,
        &[("a.less", ".a{color:red}"), ("b.less", ".b{color:blue}")],
    )?;

    build(dir.path()).await?;
    let map: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/index.css.map"))?)?;

    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "index.css");
    assert_eq!(map["sources"][0], "src/less/a.less");
    assert_eq!(map["sources"][1], "src/less/b.less");
    assert_eq!(map["sourcesContent"][0], ".a{color:red}");
    assert!(!map["mappings"].as_str().unwrap_or("").is_empty());
    Ok(())
}

#[tokio::test]
async fn variables_and_nesting_compile_through_the_pipeline() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_project(
        dir.path(),
        BASE_CONFIG,
        &[(
            "a.less",
            "@brand: #336699;\n.nav {\n  color: @brand;\n  .item { &:hover { color: red; } }\n}\n",
        )],
    )?;

    build(dir.path()).await?;
    let css = fs::read_to_string(output(dir.path()))?;
    assert!(css.contains(".nav {\n  color: #336699;\n}"), "got:\n{css}");
    assert!(css.contains(".nav .item:hover {"), "got:\n{css}");
    Ok(())
}

#[derive(Default)]
struct CountingHook {
    calls: AtomicUsize,
}

impl ReloadHook for CountingHook {
    fn artifact_written(&self, _report: &BuildReport) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn reload_hook_is_silent_while_disabled_and_fires_when_enabled() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_project(dir.path(), BASE_CONFIG, &[("a.less", ".a{color:red}")])?;

    let hook = Arc::new(CountingHook::default());
    let ctx = context(dir.path())?.with_reload_hook(hook.clone());
    run_build(&ctx).await?;
    assert_eq!(hook.calls.load(Ordering::SeqCst), 0);

    let enabled = format!("{BASE_CONFIG}\n[steps]\nlive_reload = true\n");
    fs::write(dir.path().join("stylepipe.toml"), enabled)?;
    let ctx = context(dir.path())?.with_reload_hook(hook.clone());
    run_build(&ctx).await?;
    assert_eq!(hook.calls.load(Ordering::SeqCst), 1);
    Ok(())
}
