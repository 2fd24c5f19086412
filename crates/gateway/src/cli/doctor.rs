use std::path::{Path, PathBuf};

use vc_domain::config::{Config, ConfigSeverity};
use vc_providers::ModelSelector;

/// Run all diagnostic checks and print a summary.
///
/// Returns `true` when every check passes.
pub fn run(config: &Config, config_path: &str) -> bool {
    println!("voicechat doctor");
    println!("================\n");

    let mut all_passed = true;

    check_config_file(config_path);
    check_config_validation(config, &mut all_passed);
    check_catalog(config, &mut all_passed);
    check_api_key("Model API key", &config.models.api_key_env, &mut all_passed);

    if config.speech.enabled {
        check_api_key(
            "Speech recognition API key",
            &config.speech.recognizer.api_key_env,
            &mut all_passed,
        );
        check_program("Recorder program", &config.speech.capture.program, &mut all_passed);
        check_program(
            "Synthesizer program",
            &config.speech.synthesizer.program,
            &mut all_passed,
        );
    } else {
        println!("  [SKIP] Speech: disabled in config");
    }

    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    all_passed
}

// ── Individual checks ─────────────────────────────────────────────────

fn check_config_file(config_path: &str) {
    let exists = Path::new(config_path).exists();
    // Running on defaults is allowed, so a missing file is not a failure.
    print_check(
        "Config file",
        true,
        if exists {
            config_path.to_owned()
        } else {
            format!("{config_path} not found (using defaults)")
        },
    );
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
        return;
    }

    print_check(
        "Config validation",
        error_count == 0,
        format!("{} issue(s) ({error_count} error(s))", issues.len()),
    );
    for issue in &issues {
        println!("      {issue}");
    }
    if error_count > 0 {
        *all_passed = false;
    }
}

fn check_catalog(config: &Config, all_passed: &mut bool) {
    match ModelSelector::from_config(&config.models) {
        Ok(selector) => print_check(
            "Model catalog",
            true,
            format!(
                "{} task type(s), {} alias(es), default {}",
                selector.catalog().len(),
                selector.aliases().len(),
                selector.catalog().default_task_type()
            ),
        ),
        Err(e) => {
            print_check("Model catalog", false, e.to_string());
            *all_passed = false;
        }
    }
}

fn check_api_key(name: &str, env_var: &str, all_passed: &mut bool) {
    let present = std::env::var(env_var).is_ok_and(|v| !v.trim().is_empty());
    print_check(
        name,
        present,
        if present {
            format!("{env_var} is set")
        } else {
            format!("{env_var} is not set")
        },
    );
    if !present {
        *all_passed = false;
    }
}

fn check_program(name: &str, program: &str, all_passed: &mut bool) {
    match find_program(program) {
        Some(path) => print_check(name, true, path.display().to_string()),
        None => {
            print_check(name, false, format!("{program} not found on PATH"));
            *all_passed = false;
        }
    }
}

/// Resolve `program` the way a spawn would: paths are checked directly,
/// bare names are searched on `PATH`.
fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|p| p.is_file())
}

// ── Formatting helper ─────────────────────────────────────────────────

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
