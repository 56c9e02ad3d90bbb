//! # fieldbook-cli
//!
//! Command-line interface for the fieldbook workbook library.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use fieldbook_formatting::WorkbookStyleEngine;
use fieldbook_library::{LibraryStorage, WorkbookEntry, WorkbookLibrary};
use fieldbook_sheet::{export_plain, export_styled, SheetRecord};
use fieldbook_store::{
    export_members_csv, export_members_xlsx, import_constituencies, import_mandals,
    import_members, import_panchayats, Directory, FileStore,
};
use fieldbook_types::LibraryFilter;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// fieldbook - workbook library for field organization data
#[derive(Parser)]
#[command(name = "fieldbook")]
#[command(author, version, about = "Import, inspect and export field workbooks", long_about = None)]
struct Cli {
    /// Library state directory
    #[arg(long, default_value = ".fieldbook", global = true)]
    dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import workbook files into the library
    Import {
        /// Files to import (.xlsx, .xlsm or .xls)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// List workbooks, optionally filtered by location metadata
    List {
        #[arg(long)]
        district: Option<String>,
        #[arg(long)]
        constituency: Option<String>,
        #[arg(long)]
        mandal: Option<String>,
        #[arg(long)]
        panchayat: Option<String>,
    },
    /// Export a workbook, values only
    Export {
        id: String,
        /// Output path
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Export a workbook with captured styles
    ExportStyled {
        id: String,
        /// Output path
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Delete a workbook from the library
    Delete { id: String },
    /// Delete every workbook
    Clear,
    /// Import directory records (locations or members) from a tabular file
    ImportRecords {
        /// Which record type the file holds
        #[arg(value_enum)]
        kind: RecordKind,
        /// File to import (.csv, .xlsx, .xlsm or .xls)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Export the member roster with unit and district names joined in
    ExportMembers {
        /// Output path; format follows the extension (.csv or .xlsx)
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordKind {
    Constituency,
    Mandal,
    Panchayat,
    Member,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let storage = LibraryStorage::new(&cli.dir);
    let mut library = storage
        .load()
        .with_context(|| format!("Failed to load library from {}", cli.dir.display()))?;

    match cli.command {
        Command::Import { files } => {
            let report = library.import_files(&files, &WorkbookStyleEngine);
            for id in &report.imported {
                if let Some(entry) = library.get(id) {
                    println!(
                        "{} {} ({})",
                        "imported".green(),
                        entry.display_name.bold(),
                        id
                    );
                }
            }
            for failure in &report.failures {
                eprintln!(
                    "{} {}: {}",
                    "skipped".red(),
                    failure.path.display(),
                    failure.reason
                );
            }
            storage.save(&library).context("Failed to save library")?;
            if !report.failures.is_empty() && report.imported.is_empty() {
                bail!("no files imported");
            }
        }
        Command::List {
            district,
            constituency,
            mandal,
            panchayat,
        } => {
            let filter = LibraryFilter {
                district: district.unwrap_or_default(),
                constituency: constituency.unwrap_or_default(),
                mandal: mandal.unwrap_or_default(),
                panchayat: panchayat.unwrap_or_default(),
            };
            let entries = library.filter(&filter);
            if entries.is_empty() {
                println!("{}", "no workbooks".dimmed());
            }
            for entry in entries {
                print_entry(entry, library.active_id() == Some(entry.id.as_str()));
            }
        }
        Command::Export { id, out } => {
            let bytes = export_entry(&library, &id, false)?;
            std::fs::write(&out, bytes)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("{} {}", "exported".green(), out.display());
        }
        Command::ExportStyled { id, out } => {
            let bytes = export_entry(&library, &id, true)?;
            std::fs::write(&out, bytes)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("{} {}", "exported".green(), out.display());
        }
        Command::Delete { id } => {
            if library.get(&id).is_none() {
                bail!("workbook not found: {id}");
            }
            library.delete(&id);
            storage.save(&library).context("Failed to save library")?;
            println!("{} {}", "deleted".green(), id);
        }
        Command::Clear => {
            let count = library.len();
            library.clear();
            storage.save(&library).context("Failed to save library")?;
            println!("{} {count} workbook(s)", "cleared".green());
        }
        Command::ImportRecords { kind, file } => {
            let mut records = FileStore::new(cli.dir.join("records"));
            let mut directory =
                Directory::load(&records).context("Failed to load directory records")?;
            let outcome = match kind {
                RecordKind::Constituency => import_constituencies(&mut directory, &file),
                RecordKind::Mandal => import_mandals(&mut directory, &file),
                RecordKind::Panchayat => import_panchayats(&mut directory, &file),
                RecordKind::Member => import_members(&mut directory, &file),
            }
            .with_context(|| format!("Failed to import {}", file.display()))?;
            directory
                .persist(&mut records)
                .context("Failed to save directory records")?;
            println!(
                "{} {} record(s), {} skipped",
                "imported".green(),
                outcome.added,
                outcome.skipped
            );
        }
        Command::ExportMembers { out } => {
            let records = FileStore::new(cli.dir.join("records"));
            let directory =
                Directory::load(&records).context("Failed to load directory records")?;
            let ext = out
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_lowercase();
            let bytes = match ext.as_str() {
                "csv" => export_members_csv(&directory),
                "xlsx" => export_members_xlsx(&directory),
                other => bail!("unsupported export format: {other} (expected .csv or .xlsx)"),
            }
            .context("Failed to export members")?;
            std::fs::write(&out, bytes)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!(
                "{} {} member(s) to {}",
                "exported".green(),
                directory.members.len(),
                out.display()
            );
        }
    }

    Ok(())
}

fn export_entry(library: &WorkbookLibrary, id: &str, styled: bool) -> Result<Vec<u8>> {
    let entry = library
        .get(id)
        .with_context(|| format!("workbook not found: {id}"))?;
    let sheets: Vec<SheetRecord> = entry.sheets.values().cloned().collect();
    let bytes = if styled {
        export_styled(&sheets)
    } else {
        export_plain(&sheets)
    }
    .with_context(|| format!("Failed to export {}", entry.display_name))?;
    Ok(bytes)
}

fn print_entry(entry: &WorkbookEntry, active: bool) {
    let marker = if active { "*".green() } else { " ".normal() };
    let meta = &entry.location_meta;
    let mut tags: Vec<&str> = Vec::new();
    for value in [
        &meta.district,
        &meta.constituency,
        &meta.mandal,
        &meta.panchayat,
    ] {
        if !value.is_empty() {
            tags.push(value);
        }
    }
    let tags = if tags.is_empty() {
        "-".to_string()
    } else {
        tags.join(" / ")
    };
    println!(
        "{} {}  {}  {} sheet(s)  {}  {}",
        marker,
        entry.id.dimmed(),
        entry.display_name.bold(),
        entry.sheets.len(),
        tags,
        entry
            .uploaded_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .dimmed()
    );
}
