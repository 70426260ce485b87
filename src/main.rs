mod cli;

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use futures::stream::{self, StreamExt};

use pdfbind::output::OutputFormatter;
use pdfbind::{
    OutlineMode, OverlayOptions, PageSize, PdfError, PdfService, Result, SourceDocument,
};

use crate::cli::{Cli, Command, InfoArgs, ManifestEntry, MergeArgs, NumberArgs, OverlayArgs, ResizeArgs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.quiet, cli.verbose);
    if let Err(err) = run(cli.command, &formatter).await {
        formatter.error(&err.to_string());
        process::exit(err.exit_code());
    }
}

async fn run(command: Command, formatter: &OutputFormatter) -> Result<()> {
    match command {
        Command::Merge(args) => run_merge(args, formatter).await,
        Command::Overlay(args) => run_overlay(args, formatter).await,
        Command::Number(args) => run_number(args, formatter).await,
        Command::Resize(args) => run_resize(args, formatter).await,
        Command::Info(args) => run_info(args).await,
    }
}

async fn run_merge(args: MergeArgs, formatter: &OutputFormatter) -> Result<()> {
    let default_mode: OutlineMode = args.outline.parse()?;
    let entries: Vec<ManifestEntry> = if let Some(manifest) = &args.manifest {
        cli::load_manifest(manifest)
            .await
            .map_err(|err| PdfError::invalid_input(format!("{err:#}")))?
    } else {
        if args.inputs.is_empty() {
            return Err(PdfError::invalid_input(
                "no input files given (pass files or --manifest)",
            ));
        }
        cli::expand_inputs(&args.inputs)
            .map_err(|err| PdfError::invalid_input(format!("{err:#}")))?
            .into_iter()
            .map(|path| ManifestEntry {
                path,
                title: None,
                outline: None,
                start_on_odd_page: args.start_on_odd_page,
                bookmark_styles: Default::default(),
            })
            .collect()
    };
    check_output(&args.output, args.force).await?;

    let jobs = args
        .jobs
        .or_else(|| std::thread::available_parallelism().ok().map(usize::from))
        .unwrap_or(1)
        .max(1);
    formatter.info(&format!("Loading {} documents...", entries.len()));
    let contents: Vec<Result<Vec<u8>>> = stream::iter(entries.iter().map(|entry| {
        let path = entry.path.clone();
        async move {
            tokio::fs::read(&path)
                .await
                .map_err(|source| PdfError::Resource { path, source })
        }
    }))
    .buffered(jobs)
    .collect()
    .await;

    let mut sources = Vec::with_capacity(entries.len());
    for (entry, content) in entries.iter().zip(contents) {
        let content = content?;
        formatter.detail(
            &entry.path.display().to_string(),
            &format!("{} bytes", content.len()),
        );
        sources.push(SourceDocument {
            content,
            title: entry
                .title
                .clone()
                .unwrap_or_else(|| cli::default_title(&entry.path)),
            outline_mode: entry.outline.unwrap_or(default_mode),
            start_on_odd_page: entry.start_on_odd_page,
            bookmark_styles: entry.bookmark_styles.clone(),
        });
    }

    let service = PdfService::new();
    let output = match &args.page_size {
        Some(size) => {
            let page_size: PageSize = size.parse()?;
            service
                .resize_merge(sources, page_size, args.landscape)
                .await?
        }
        None => service.merge(sources).await?,
    };
    write_output(&args.output, &output.content).await?;
    formatter.success(&format!(
        "Wrote {} pages to {}",
        output.page_count,
        args.output.display()
    ));
    Ok(())
}

async fn run_overlay(args: OverlayArgs, formatter: &OutputFormatter) -> Result<()> {
    check_output(&args.output, args.force).await?;
    let options = OverlayOptions {
        vertical: args.vertical.parse()?,
        horizontal: args.horizontal.parse()?,
        font_name: args.font,
        font_size: args.size,
        margin: args.margin,
    };
    let input = read_input(&args.input).await?;
    let stamped = PdfService::new()
        .add_overlay(input, args.text, options)
        .await?;
    write_output(&args.output, &stamped).await?;
    formatter.success(&format!("Wrote {}", args.output.display()));
    Ok(())
}

async fn run_number(args: NumberArgs, formatter: &OutputFormatter) -> Result<()> {
    check_output(&args.output, args.force).await?;
    let options = OverlayOptions {
        font_name: args.font,
        font_size: args.size,
        margin: args.margin,
        ..OverlayOptions::default()
    };
    let input = read_input(&args.input).await?;
    let numbered = PdfService::new()
        .add_page_numbers(input, args.skip, args.first, args.total, options)
        .await?;
    write_output(&args.output, &numbered).await?;
    formatter.success(&format!("Wrote {}", args.output.display()));
    Ok(())
}

async fn run_resize(args: ResizeArgs, formatter: &OutputFormatter) -> Result<()> {
    check_output(&args.output, args.force).await?;
    let page_size: PageSize = args.page_size.parse()?;
    let input = read_input(&args.input).await?;
    let resized = PdfService::new()
        .resize(input, Some(page_size), args.landscape, args.margin)
        .await?;
    write_output(&args.output, &resized).await?;
    formatter.success(&format!(
        "Wrote {} ({page_size}{})",
        args.output.display(),
        if args.landscape { ", landscape" } else { "" }
    ));
    Ok(())
}

async fn run_info(args: InfoArgs) -> Result<()> {
    let input = read_input(&args.input).await?;
    let info = PdfService::new().document_info(input).await?;
    let json = serde_json::to_string_pretty(&info)
        .map_err(|err| PdfError::Other(err.to_string()))?;
    println!("{json}");
    Ok(())
}

async fn read_input(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|source| PdfError::Resource {
            path: path.to_path_buf(),
            source,
        })
}

async fn check_output(path: &Path, force: bool) -> Result<()> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|source| PdfError::Resource {
            path: path.to_path_buf(),
            source,
        })?;
    if exists && !force {
        return Err(PdfError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

/// Write through a temporary file in the same directory, so a failed
/// write never leaves a truncated output behind.
async fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let tmp: PathBuf = {
        let mut name = path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    };
    let failed = |source| PdfError::Resource {
        path: path.to_path_buf(),
        source,
    };
    tokio::fs::write(&tmp, content).await.map_err(failed)?;
    if let Err(source) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(failed(source));
    }
    Ok(())
}
