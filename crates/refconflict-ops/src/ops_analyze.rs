//! Operation: build the reference graph of an entry module and analyse it
//! against binding redirects.

use std::path::{Path, PathBuf};

use refconflict_core::config::{GlobalConfig, OutputFormat};
use refconflict_core::redirect::BindingRedirect;
use refconflict_metadata::appconfig::{load_binding_redirects, suggest_config_file};
use refconflict_metadata::dotnet::DotnetProvider;
use refconflict_metadata::probe::GlobalProbe;
use refconflict_metadata::provider::MetadataProvider;
use refconflict_resolver::builder::GraphBuilder;
use refconflict_resolver::conflict::{self, ConflictReport};
use refconflict_resolver::graph::{Category, ReferenceGraph};
use refconflict_resolver::skip::SkipPolicy;
use refconflict_util::errors::{RefConflictError, RefConflictResult};
use refconflict_util::progress;

/// Options for `refconflict analyze` and friends.
#[derive(Debug, Default, Clone)]
pub struct AnalyzeOptions {
    /// Global config file; defaults to `~/.refconflict/config.toml`.
    pub config: Option<PathBuf>,
    /// Application config holding binding redirects. When unset, one is
    /// looked for next to the entry module.
    pub app_config: Option<PathBuf>,
    /// Disable the configured skip list.
    pub no_skip: bool,
    /// Extra module names to skip.
    pub skip_names: Vec<String>,
    /// Extra module name prefixes to skip.
    pub skip_prefixes: Vec<String>,
    /// Extra global lookup roots, searched before the configured ones.
    pub probe_paths: Vec<PathBuf>,
}

/// The outcome of an analysis.
#[derive(Debug)]
pub struct Analysis {
    /// The graph with conflict categories applied.
    pub graph: ReferenceGraph,
    pub report: ConflictReport,
    pub redirects: Vec<BindingRedirect>,
    /// The application config the redirects came from, if any.
    pub config_file: Option<PathBuf>,
}

/// Load the global configuration named by `opts`, or the default one.
pub fn load_config(opts: &AnalyzeOptions) -> RefConflictResult<GlobalConfig> {
    match &opts.config {
        Some(path) => GlobalConfig::load_from(path),
        None => GlobalConfig::load(),
    }
}

/// The skip policy for a run: the configured one (unless disabled) plus any
/// names and prefixes given on the command line.
pub fn skip_policy(opts: &AnalyzeOptions, config: &GlobalConfig) -> SkipPolicy {
    let mut policy = if opts.no_skip {
        SkipPolicy::none()
    } else {
        SkipPolicy::from_config(&config.skip)
    };
    for name in &opts.skip_names {
        policy = policy.with_name(name);
    }
    for prefix in &opts.skip_prefixes {
        policy = policy.with_prefix(prefix);
    }
    policy
}

/// Analyse `entry` with the .NET metadata provider.
pub fn analyze(entry: &Path, opts: &AnalyzeOptions) -> RefConflictResult<Analysis> {
    let config = load_config(opts)?;
    let roots = opts
        .probe_paths
        .iter()
        .chain(config.probe.paths.iter())
        .cloned();
    let probe = GlobalProbe::new(roots, config.probe.extensions.clone());
    tracing::debug!("global lookup roots: {:?}", probe.roots());
    analyze_with(entry, opts, &config, DotnetProvider::new(probe))
}

/// Analyse `entry` with an explicit provider and configuration.
pub fn analyze_with<P: MetadataProvider>(
    entry: &Path,
    opts: &AnalyzeOptions,
    config: &GlobalConfig,
    provider: P,
) -> RefConflictResult<Analysis> {
    progress::status("Analyzing", &entry.display().to_string());

    let policy = skip_policy(opts, config);
    let graph = GraphBuilder::new(provider)
        .with_extensions(config.probe.extensions.clone())
        .build(entry, |name| policy.matches(name))?;

    let config_file = match &opts.app_config {
        Some(path) if !path.is_file() => {
            return Err(RefConflictError::AppConfig {
                path: path.display().to_string(),
                message: "file not found".to_string(),
            }
            .into());
        }
        Some(path) => Some(path.clone()),
        None => suggest_config_file(entry),
    };
    let redirects = match &config_file {
        Some(path) => {
            progress::status_info("Redirects", &path.display().to_string());
            load_binding_redirects(path)?
        }
        None => {
            tracing::info!("no application config found for {}", entry.display());
            Vec::new()
        }
    };
    tracing::info!("{} binding redirect(s) loaded", redirects.len());

    let (graph, report) = conflict::analyze_with_report(&graph, &redirects);

    let missing = graph.count(Category::Missing);
    if missing > 0 {
        progress::status_warn("Missing", &format!("{missing} module(s) could not be loaded"));
    }
    if report.unresolved_count() > 0 {
        progress::status_warn(
            "Conflicts",
            &format!("{} unresolved of {}", report.unresolved_count(), report.len()),
        );
    }

    Ok(Analysis {
        graph,
        report,
        redirects,
        config_file,
    })
}

/// Render an analysis in the requested format.
pub fn render(analysis: &Analysis, format: OutputFormat) -> RefConflictResult<String> {
    let output = match format {
        OutputFormat::Text => crate::render::text(&analysis.graph),
        OutputFormat::Tree => analysis.graph.print_tree(None),
        OutputFormat::Dgml => crate::render::dgml(&analysis.graph)?,
        OutputFormat::Json => crate::render::json(&analysis.graph, &analysis.report)?,
    };
    Ok(output)
}

/// Write `output` to `path`, or to stdout when no path is given.
pub fn emit(output: &str, path: Option<&Path>) -> RefConflictResult<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                refconflict_util::fs::ensure_dir(parent).map_err(RefConflictError::Io)?;
            }
            std::fs::write(path, output).map_err(RefConflictError::Io)?;
            progress::status("Written", &path.display().to_string());
        }
        None => print!("{output}"),
    }
    Ok(())
}
