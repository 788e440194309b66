//! config command - List or set configuration values

use anyhow::{bail, Context as _, Result};
use serde::Serialize;

use super::{project_root, verbosity};
use crate::core::config::{Config, ProjectConfig, RouteOnRename};
use crate::engine::Context;
use crate::ui::output;

/// Keys accepted by `fizz config set`.
const PROJECT_KEYS: &[&str] = &[
    "specs_dir",
    "shell_script",
    "batch_script",
    "build_cmd",
    "packager",
    "route_on_rename",
    "run_scripts",
];

#[derive(Debug, Serialize)]
struct EffectiveConfig<'a> {
    specs_dir: &'a str,
    shell_script: &'a str,
    batch_script: &'a str,
    build_cmd: &'a str,
    packager: &'a str,
    route_on_rename: RouteOnRename,
    run_scripts: bool,
    global_config: Option<String>,
    project_config: Option<String>,
}

/// Set a project configuration value in `<root>/.fizz/config.toml`.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let root = project_root(ctx)?;
    let config = Config::load(Some(&root)).context("Failed to load config")?;
    let mut project = config.project.unwrap_or_default();

    apply(&mut project, key, value)?;

    let path = Config::write_project(&root, &project).context("Failed to write config")?;
    output::success(format!("Set {} = {}", key, value), verbosity(ctx));
    output::debug(format!("wrote {}", path.display()), verbosity(ctx));
    Ok(())
}

fn apply(project: &mut ProjectConfig, key: &str, value: &str) -> Result<()> {
    let text = || Some(value.to_string());
    match key {
        "specs_dir" => project.specs_dir = text(),
        "shell_script" => project.shell_script = text(),
        "batch_script" => project.batch_script = text(),
        "build_cmd" => project.build_cmd = text(),
        "packager" => project.packager = text(),
        "route_on_rename" => project.route_on_rename = Some(value.parse()?),
        "run_scripts" => {
            let run: bool = value
                .parse()
                .with_context(|| format!("run_scripts must be true or false, got '{}'", value))?;
            project.run_scripts = Some(run);
        }
        _ => bail!(
            "Unknown configuration key: {} (expected one of: {})",
            key,
            PROJECT_KEYS.join(", ")
        ),
    }
    Ok(())
}

/// List effective configuration values and where they were loaded from.
pub fn list(ctx: &Context) -> Result<()> {
    let root = project_root(ctx)?;
    let config = Config::load(Some(&root)).context("Failed to load config")?;

    let effective = EffectiveConfig {
        specs_dir: config.specs_dir(),
        shell_script: config.shell_script(),
        batch_script: config.batch_script(),
        build_cmd: config.build_cmd(),
        packager: config.packager(),
        route_on_rename: config.route_on_rename(),
        run_scripts: config.run_scripts(),
        global_config: config
            .global_config_loaded_from()
            .map(|p| p.display().to_string()),
        project_config: config
            .project_config_loaded_from()
            .map(|p| p.display().to_string()),
    };

    if ctx.json {
        return output::json(&effective);
    }

    println!("# Effective Configuration");
    println!("specs_dir = {}", effective.specs_dir);
    println!("shell_script = {}", effective.shell_script);
    println!("batch_script = {}", effective.batch_script);
    println!("build_cmd = {}", effective.build_cmd);
    println!("packager = {}", effective.packager);
    println!(
        "route_on_rename = {}",
        match effective.route_on_rename {
            RouteOnRename::FollowName => "follow-name",
            RouteOnRename::Preserve => "preserve",
        }
    );
    println!("run_scripts = {}", effective.run_scripts);
    println!();
    println!("# Sources");
    println!(
        "global = {}",
        effective.global_config.as_deref().unwrap_or("(none)")
    );
    println!(
        "project = {}",
        effective.project_config.as_deref().unwrap_or("(none)")
    );
    Ok(())
}
