//! Write run, build and platform metadata to a TOML file.
//!
//! Alongside the program build and the host platform, the run section records which model was
//! processed, the data and target years, and what was written to the JSON-LD archive.
use super::jsonld::ArchiveSummary;
use crate::model::Model;
use anyhow::{Result, anyhow};
use chrono::prelude::*;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output filename used for metadata.
const METADATA_FILE_NAME: &str = "metadata.toml";

/// Build-time information included by the build script (via the `built` crate).
#[allow(clippy::doc_markdown)]
#[allow(clippy::needless_raw_strings)]
mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Return a short git commit hash for the build, or `"unknown"` when not
/// available. If the source tree was dirty at build time, `-dirty` is appended.
fn get_git_hash() -> String {
    let Some(hash) = built_info::GIT_COMMIT_HASH_SHORT else {
        return "unknown".into();
    };

    if built_info::GIT_DIRTY == Some(true) {
        format!("{hash}-dirty")
    } else {
        hash.into()
    }
}

#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    program: ProgramMetadata<'a>,
    platform: PlatformMetadata,
}

/// Information about the inventory run
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Name of the model, used as the archive prefix
    model_name: &'a str,
    /// Path to the model which was processed
    model_path: &'a Path,
    /// Year of the generation data
    eia_gen_year: u32,
    /// Year against which data quality is scored
    target_year: u32,
    /// The date and time on which the run started
    datetime: String,
    /// File name of the JSON-LD archive
    archive: &'a str,
    /// Number of unit processes in the archive
    process_count: usize,
    /// Number of categories in the archive
    category_count: usize,
}

#[derive(Serialize)]
struct ProgramMetadata<'a> {
    /// The program name
    name: &'a str,
    /// The program version as specified in Cargo.toml
    version: &'a str,
    /// The target architecture for the build (e.g. x86_64-unknown-linux-gnu)
    target: &'a str,
    /// Whether it is a debug build
    is_debug: bool,
    /// The version of rustc used to compile the program
    rustc_version: &'a str,
    /// When the program was built
    build_time_utc: &'a str,
    /// The git commit hash for the build (if known)
    git_commit_hash: String,
}

impl Default for ProgramMetadata<'_> {
    fn default() -> Self {
        Self {
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            target: built_info::TARGET,
            is_debug: built_info::DEBUG,
            rustc_version: built_info::RUSTC_VERSION,
            build_time_utc: built_info::BUILT_TIME_UTC,
            git_commit_hash: get_git_hash(),
        }
    }
}

/// Information about the host platform, from [`PlatformInfo`]
#[derive(Serialize)]
struct PlatformMetadata {
    sysname: String,
    nodename: String,
    release: String,
    version: String,
    machine: String,
    osname: String,
}

impl PlatformMetadata {
    fn new() -> Result<Self> {
        let info = PlatformInfo::new()
            .map_err(|err| anyhow!("Unable to determine platform info: {err}"))?;
        Ok(Self {
            sysname: info.sysname().to_string_lossy().into(),
            nodename: info.nodename().to_string_lossy().into(),
            release: info.release().to_string_lossy().into(),
            version: info.version().to_string_lossy().into(),
            machine: info.machine().to_string_lossy().into(),
            osname: info.osname().to_string_lossy().into(),
        })
    }
}

/// Write metadata to `metadata.toml` in the given output directory.
///
/// # Arguments
///
/// * `output_path` - Directory where `metadata.toml` will be written
/// * `model` - The model that was processed
/// * `started` - When the run started
/// * `archive` - File name of the JSON-LD archive written
/// * `summary` - What the archive contains
pub fn write_metadata(
    output_path: &Path,
    model: &Model,
    started: DateTime<Local>,
    archive: &str,
    summary: ArchiveSummary,
) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata {
            model_name: &model.config.model_name,
            model_path: &model.model_path,
            eia_gen_year: model.config.eia_gen_year,
            target_year: model.config.target_year(),
            datetime: started.to_rfc2822(),
            archive,
            process_count: summary.processes,
            category_count: summary.categories,
        },
        program: ProgramMetadata::default(),
        platform: PlatformMetadata::new()?,
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}
