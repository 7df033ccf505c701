//! Command implementations for celldiff CLI

use crate::cli::{Commands, LoadArgs, ReportArgs};
use crate::config::{CompareConfig, OutputFormat};
use crate::diagnostics::{CallbackSink, Diagnostic, DiagnosticSink, LogSink};
use crate::discovery::{self, FilePattern};
use crate::error::{CelldiffError, Result};
use crate::loader::CsvLoader;
use crate::orchestrator::{Comparator, FileReport};
use crate::output::{CsvFormatter, JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use std::path::Path;

/// Execute a command
pub fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Compare {
            new_dir,
            old_dir,
            pattern,
            load,
            report,
            jobs,
            config,
            quiet,
        } => {
            let mut settings = resolve_config(config.as_deref(), &load, &report)?;
            if let Some(pattern) = pattern {
                settings.pattern = pattern;
            }
            if let Some(jobs) = jobs {
                settings.jobs = jobs;
            }
            settings.validate()?;
            compare_command(&new_dir, &old_dir, &settings, report.output.as_deref(), quiet)
        }
        Commands::File {
            filename,
            new_dir,
            old_dir,
            load,
            report,
            config,
        } => {
            let settings = resolve_config(config.as_deref(), &load, &report)?;
            settings.validate()?;
            file_command(&filename, &new_dir, &old_dir, &settings, report.output.as_deref())
        }
        Commands::List {
            new_dir,
            old_dir,
            pattern,
            format,
        } => list_command(&new_dir, &old_dir, pattern.as_deref(), &format),
    }
}

/// Config file (or defaults) with command-line flags applied on top
fn resolve_config(config_path: Option<&Path>, load: &LoadArgs, report: &ReportArgs) -> Result<CompareConfig> {
    let mut config = match config_path {
        Some(path) => CompareConfig::from_file(path)?,
        None => CompareConfig::default(),
    };
    load.apply(&mut config);
    report.apply(&mut config)?;
    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Diff every matching file between two directories
fn compare_command(
    new_dir: &Path,
    old_dir: &Path,
    config: &CompareConfig,
    output_path: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let pattern = FilePattern::new(&config.pattern)?;
    let loader = CsvLoader::new(config.load.clone())?;

    let interactive = config.format == OutputFormat::Pretty && !quiet && output_path.is_none();
    let mut progress = if interactive {
        ProgressReporter::new_for_compare()
    } else {
        ProgressReporter::new_minimal()
    };
    let reports = if config.jobs > 1 {
        // The pool discovers files itself, so the bar length comes from its events
        progress.start_files(0);
        let progress = &progress;
        let sink = CallbackSink(move |event: Diagnostic| {
            if let Diagnostic::FileCompared { filename, total, .. } = &event {
                progress.file_done(filename, *total as u64);
            }
            LogSink.emit(event);
        });
        Comparator::new(loader, sink)
            .with_policy(config.missing_both)
            .compare_dirs_parallel(new_dir, old_dir, &pattern, config.jobs)?
    } else {
        let comparator = Comparator::new(loader, LogSink).with_policy(config.missing_both);
        let files = comparator.compare_dirs(new_dir, old_dir, &pattern)?;
        let total = files.total();
        progress.start_files(total as u64);

        let mut reports: Vec<FileReport> = Vec::with_capacity(total);
        for report in files {
            let report = report?;
            progress.file_done(&report.filename, total as u64);
            reports.push(report);
        }
        reports
    };
    progress.finish("done");

    if quiet {
        print!("{}", PrettyPrinter::format_quiet(&reports));
        return Ok(());
    }

    let rendered = render(config.format, new_dir, old_dir, &reports)?;
    emit(&rendered, output_path)
}

/// Diff a single file
fn file_command(
    filename: &str,
    new_dir: &Path,
    old_dir: &Path,
    config: &CompareConfig,
    output_path: Option<&Path>,
) -> Result<()> {
    let loader = CsvLoader::new(config.load.clone())?;
    let comparator = Comparator::new(loader, LogSink).with_policy(config.missing_both);
    let report = comparator.report(filename, new_dir, old_dir)?;

    let rendered = render(config.format, new_dir, old_dir, std::slice::from_ref(&report))?;
    emit(&rendered, output_path)
}

/// List matching files on both sides
fn list_command(new_dir: &Path, old_dir: &Path, pattern: Option<&str>, format: &str) -> Result<()> {
    let output_format = OutputFormat::parse(format).map_err(CelldiffError::invalid_input)?;
    let pattern = FilePattern::new(pattern.unwrap_or(crate::config::DEFAULT_PATTERN))?;
    let listing = discovery::survey(new_dir, old_dir, &pattern)?;

    match output_format {
        OutputFormat::Pretty => print!("{}", PrettyPrinter::format_listing(&listing)),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&listing)?),
        OutputFormat::Csv => {
            return Err(CelldiffError::invalid_input("list supports 'pretty' or 'json' output"));
        }
    }

    Ok(())
}

fn render(format: OutputFormat, new_dir: &Path, old_dir: &Path, reports: &[FileReport]) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(PrettyPrinter::default().format_reports(
            &new_dir.display().to_string(),
            &old_dir.display().to_string(),
            reports,
        )),
        OutputFormat::Json => JsonFormatter::format_reports(reports).map(|json| json + "\n"),
        OutputFormat::Csv => CsvFormatter::format_reports(reports),
    }
}

/// Print to stdout or save to `output_path`
fn emit(content: &str, output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => {
            // Create parent directories if needed
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
            println!("💾 Results saved to: {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
