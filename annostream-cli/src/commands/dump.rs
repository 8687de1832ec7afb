use std::{collections::HashSet, path::Path};

use anyhow::Context;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{open_reader, ValueInfo},
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
pub struct EntryInfo {
    pub name: String,
    pub r#type: String,
    pub offset: u64,
    pub length: u64,
    /// A later entry with the same name hides this one from lookups
    pub shadowed: bool,
    pub value: ValueInfo,
    #[serde(skip)]
    pub display: String,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let mut reader = open_reader(path)?;
    let entries = reader.entries().to_vec();

    let mut seen = HashSet::new();
    let mut shadowed: Vec<bool> = entries
        .iter()
        .rev()
        .map(|entry| !seen.insert(entry.name.as_str()))
        .collect();
    shadowed.reverse();

    let mut dump = Vec::with_capacity(entries.len());
    for (entry, shadowed) in entries.iter().zip(shadowed) {
        let value = reader
            .read_entry(entry)
            .with_context(|| format!("failed to read entry: {}", entry.name))?;
        dump.push(EntryInfo {
            name: entry.name.clone(),
            r#type: entry.tag.to_string(),
            offset: entry.offset,
            length: entry.length,
            shadowed,
            value: ValueInfo::from(&value),
            display: value.to_string(),
        });
    }

    print_output(&dump, opts, |dump| {
        if dump.is_empty() {
            println!("No entries.");
            return;
        }

        let mut tw = TabWriter::new(&[
            ("Name", Align::Left),
            ("Type", Align::Left),
            ("Offset", Align::Right),
            ("Bytes", Align::Right),
            ("Value", Align::Left),
        ]);
        for entry in dump {
            let name = if entry.shadowed {
                format!("{} (shadowed)", entry.name)
            } else {
                entry.name.clone()
            };
            tw.row(vec![
                name,
                entry.r#type.clone(),
                entry.offset.to_string(),
                entry.length.to_string(),
                entry.display.clone(),
            ]);
        }
        tw.print();
    })
}
