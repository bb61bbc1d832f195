//! Command implementations.
//!
//! Each command renders its output to a `String`; `main` prints it.

use anyhow::Context;
use comfy_table::{presets::UTF8_FULL, Table};
use fixturekit_config::ConfigProvider;
use fixturekit_directory::{DirectoryResolver, Fixture};
use std::path::Path;

use crate::cli::Commands;

/// Build a resolver for `from` (default: the current directory).
///
/// Configuration files are discovered in the starting directory, followed by
/// `config_file` when given and `FIXTUREKIT_` environment variables.
pub fn build_resolver(
    from: Option<&Path>,
    config_file: Option<&Path>,
) -> anyhow::Result<DirectoryResolver> {
    let start = match from {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    let project_dir = if start.is_dir() {
        start.clone()
    } else {
        start.parent().map(Path::to_path_buf).unwrap_or_default()
    };

    let mut provider = ConfigProvider::new().with_project_dir(project_dir);
    if let Some(file) = config_file {
        provider = provider.with_file(file);
    }
    let config = provider.load().context("failed to load configuration")?;
    tracing::debug!("Discovery options: {:?}", config.discovery);

    Ok(DirectoryResolver::new(start).with_options(config.discovery))
}

/// Run one command and return what it prints.
pub fn run(resolver: &DirectoryResolver, command: &Commands) -> anyhow::Result<String> {
    match command {
        Commands::Locate => locate(resolver),
        Commands::Get { name, ext } => get(resolver, name, ext.as_deref()),
        Commands::List { ext, json } => {
            let fixtures = match ext {
                Some(ext) => resolver.list_fixtures_with_extension(ext)?,
                None => resolver.list_fixtures()?,
            };
            render_fixtures(&fixtures, *json)
        }
        Commands::Find { pattern, json } => {
            render_fixtures(&resolver.find_fixtures(pattern)?, *json)
        }
        Commands::Extensions => Ok(resolver
            .available_extensions()?
            .into_iter()
            .map(|ext| ext + "\n")
            .collect()),
    }
}

fn locate(resolver: &DirectoryResolver) -> anyhow::Result<String> {
    let resolved = resolver.resolve()?;
    tracing::info!("Resolved via {}", resolved.strategy);
    Ok(line(&resolved.path))
}

fn get(resolver: &DirectoryResolver, name: &str, ext: Option<&str>) -> anyhow::Result<String> {
    let path = match ext {
        Some(ext) => resolver.fixture(name, ext)?,
        None => resolver.fixture_file(name)?,
    };
    Ok(line(&path))
}

fn line(path: &Path) -> String {
    format!("{}\n", path.display())
}

/// Render fixtures as a table, or as a JSON array when `json` is set.
pub fn render_fixtures(fixtures: &[Fixture], json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(fixtures)? + "\n");
    }
    if fixtures.is_empty() {
        return Ok("No fixtures found.\n".to_string());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Fixture", "Name", "Extension", "Path"]);
    for fixture in fixtures {
        table.add_row(vec![
            fixture.id().to_string(),
            fixture.name().to_string(),
            fixture.file_extension().to_string(),
            fixture.location().display().to_string(),
        ]);
    }

    Ok(format!("{table}\n\n{} fixture(s) found\n", fixtures.len()))
}
