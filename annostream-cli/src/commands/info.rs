use std::{collections::HashSet, path::Path};

use annostream::annotated::{PREAMBLE_SIZE, VERSION};
use serde::Serialize;

use crate::{app::GlobalOptions, commands::common::open_reader, output::print_output};

#[derive(Debug, Serialize)]
pub struct StreamInfo {
    pub path: String,
    pub format_version: u8,
    pub byte_order: String,
    pub size: u64,
    pub data_size: u64,
    pub trailer_size: u64,
    pub entry_count: usize,
    pub distinct_names: usize,
    pub top_level: Vec<String>,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let reader = open_reader(path)?;

    let distinct_names = reader
        .entries()
        .iter()
        .map(|entry| entry.name.as_str())
        .collect::<HashSet<_>>()
        .len();

    // The reader starts at offset zero, so entry offsets are absolute here
    let data_end = reader
        .entries()
        .iter()
        .map(|entry| entry.offset + entry.length)
        .max()
        .unwrap_or(PREAMBLE_SIZE);

    let info = StreamInfo {
        path: path.display().to_string(),
        format_version: VERSION,
        byte_order: reader
            .byte_order()
            .map_or_else(|| "unknown".to_string(), |order| order.to_string()),
        size: reader.size(),
        data_size: data_end - PREAMBLE_SIZE,
        trailer_size: reader.size().saturating_sub(data_end),
        entry_count: reader.len(),
        distinct_names,
        top_level: reader.keys(),
    };

    print_output(&info, opts, |info| {
        println!("File:            {}", info.path);
        println!("Format version:  {}", info.format_version);
        println!("Byte order:      {}", info.byte_order);
        println!("Size:            {} bytes", info.size);
        println!("Data:            {} bytes", info.data_size);
        println!("Trailer:         {} bytes", info.trailer_size);
        println!("Entries:         {}", info.entry_count);
        println!("Distinct names:  {}", info.distinct_names);
        if !info.top_level.is_empty() {
            println!("Top level:       {}", info.top_level.join(", "));
        }
    })
}
