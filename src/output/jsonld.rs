//! Write unit processes to a JSON-LD archive in the openLCA schema.
//!
//! Every process and each level of its category path is written as a separate JSON file in a zip
//! archive. Identifiers are derived from content, so writing the same processes again gives the
//! same identifiers.
use crate::id::{category_id, process_id};
use crate::process::{Exchange, FlowType, Process, ProcessMap, ReferenceEntity};
use anyhow::{Context, Result};
use log::{debug, error};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Version of the openLCA schema written
const SCHEMA_VERSION: u32 = 2;

/// File recording the schema version
const SCHEMA_FILE_NAME: &str = "olca-schema.json";

/// Counts of records written to an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub processes: usize,
    pub categories: usize,
}

#[derive(Serialize)]
struct SchemaInfo {
    version: u32,
}

/// A reference to another record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Ref {
    #[serde(rename = "@type")]
    kind: &'static str,
    #[serde(rename = "@id")]
    id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_path: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flow_type: Option<&'static str>,
}

impl Ref {
    fn reference(kind: &'static str, entity: ReferenceEntity) -> Self {
        Self {
            kind,
            id: entity.id.to_string(),
            name: entity.name.to_string(),
            category_path: None,
            flow_type: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryRecord {
    #[serde(rename = "@type")]
    kind: &'static str,
    #[serde(rename = "@id")]
    id: String,
    name: String,
    model_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<Ref>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRecord {
    #[serde(rename = "@type")]
    kind: &'static str,
    internal_id: u32,
    input: bool,
    quantitative_reference: bool,
    avoided_product: bool,
    amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    flow: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flow_property: Option<Ref>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRecord<'a> {
    #[serde(rename = "@type")]
    kind: &'static str,
    #[serde(rename = "@id")]
    id: String,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<Ref>,
    process_type: &'static str,
    exchanges: Vec<ExchangeRecord>,
}

/// Writes records into a zip archive, creating each category at most once
struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
    created_ids: HashSet<String>,
    summary: ArchiveSummary,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            created_ids: HashSet::new(),
            summary: ArchiveSummary {
                processes: 0,
                categories: 0,
            },
        }
    }

    fn write_json<T: Serialize>(&mut self, name: &str, value: &T) -> Result<()> {
        self.zip
            .start_file(name, self.options)
            .with_context(|| format!("Could not add {name} to archive"))?;
        self.zip.write_all(&serde_json::to_vec_pretty(value)?)?;

        Ok(())
    }

    /// Write every level of a category path, returning a reference to the last
    fn write_category(&mut self, path: Option<&str>) -> Result<Option<Ref>> {
        let Some(path) = path.filter(|path| !path.trim().is_empty()) else {
            return Ok(None);
        };

        let parts: Vec<_> = path.split('/').collect();
        let mut parent = None;
        for i in 0..parts.len() {
            let prefix = &parts[..=i];
            let id = category_id(prefix);
            let name = parts[i].trim().to_string();
            if self.created_ids.insert(id.clone()) {
                let category = CategoryRecord {
                    kind: "Category",
                    id: id.clone(),
                    name: name.clone(),
                    model_type: "PROCESS",
                    category: parent.take(),
                };
                self.write_json(&format!("categories/{id}.json"), &category)?;
                self.summary.categories += 1;
            }

            parent = Some(Ref {
                kind: "Category",
                id,
                name,
                category_path: Some(prefix.iter().map(|part| part.to_string()).collect()),
                flow_type: None,
            });
        }

        Ok(parent)
    }

    fn write_process(&mut self, process: &Process) -> Result<()> {
        let id = process_id(process.category.as_deref(), &process.name);
        let category = self.write_category(process.category.as_deref())?;
        let exchanges = process
            .exchanges
            .iter()
            .flatten()
            .zip(1..)
            .map(|(exchange, internal_id)| exchange_record(exchange, internal_id))
            .collect();

        let record = ProcessRecord {
            kind: "Process",
            id: id.clone(),
            name: &process.name,
            description: process.description.as_deref(),
            category,
            process_type: "UNIT_PROCESS",
            exchanges,
        };
        self.write_json(&format!("processes/{id}.json"), &record)?;
        self.summary.processes += 1;
        debug!("Wrote process {} ({id})", process.name);

        Ok(())
    }

    fn finish(self) -> Result<ArchiveSummary> {
        self.zip.finish().context("Could not finalise archive")?;
        Ok(self.summary)
    }
}

fn exchange_record(exchange: &Exchange, internal_id: u32) -> ExchangeRecord {
    let unit_name = exchange.unit.name();
    let unit = exchange.unit.reference().map(|unit| Ref::reference("Unit", unit));
    if unit.is_none() {
        error!("unknown unit {unit_name}; no unit reference");
    }
    let flow_property = exchange
        .unit
        .flow_property()
        .map(|property| Ref::reference("FlowProperty", property));
    if flow_property.is_none() {
        error!("unknown unit {unit_name}; no flow property reference");
    }

    ExchangeRecord {
        kind: "Exchange",
        internal_id,
        input: exchange.input.unwrap_or(false),
        quantitative_reference: exchange.quantitative_reference.unwrap_or(false),
        avoided_product: exchange.avoided_product.unwrap_or(false),
        amount: exchange.amount.unwrap_or(0.0),
        flow: exchange.flow.as_ref().map(|flow| Ref {
            kind: "Flow",
            id: flow.id.clone(),
            name: flow.name.clone(),
            category_path: None,
            flow_type: Some(match flow.flow_type {
                FlowType::Product => "PRODUCT_FLOW",
                FlowType::Elementary => "ELEMENTARY_FLOW",
            }),
        }),
        unit,
        flow_property,
    }
}

/// Write processes to a JSON-LD zip archive at the given path
pub fn write_processes(processes: &ProcessMap, file_path: &Path) -> Result<ArchiveSummary> {
    let file = File::create(file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    write_processes_to(processes, file)
        .with_context(|| format!("Could not write archive {}", file_path.display()))
}

/// Write processes as a JSON-LD zip archive to `writer`
pub fn write_processes_to<W: Write + Seek>(
    processes: &ProcessMap,
    writer: W,
) -> Result<ArchiveSummary> {
    let mut archive = ArchiveWriter::new(writer);
    archive.write_json(
        SCHEMA_FILE_NAME,
        &SchemaInfo {
            version: SCHEMA_VERSION,
        },
    )?;
    for process in processes.values() {
        archive.write_process(process)?;
    }

    archive.finish()
}
