use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{enter_scope, open_reader},
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
pub struct KeyInfo {
    pub name: String,
    pub r#type: String,
    pub offset: u64,
    pub length: u64,
}

pub fn run(path: &Path, scope: Option<&str>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let mut reader = open_reader(path)?;
    if let Some(scope) = scope {
        enter_scope(&mut reader, scope)?;
    }

    let keys: Vec<KeyInfo> = reader
        .keys()
        .into_iter()
        .filter_map(|name| {
            let entry = reader.entry(&name)?;
            Some(KeyInfo {
                r#type: entry.tag.to_string(),
                offset: entry.offset,
                length: entry.length,
                name,
            })
        })
        .collect();

    print_output(&keys, opts, |keys| {
        if keys.is_empty() {
            println!("No keys.");
            return;
        }

        let mut tw = TabWriter::new(&[
            ("Name", Align::Left),
            ("Type", Align::Left),
            ("Offset", Align::Right),
            ("Bytes", Align::Right),
        ]);
        for key in keys {
            tw.row(vec![
                key.name.clone(),
                key.r#type.clone(),
                key.offset.to_string(),
                key.length.to_string(),
            ]);
        }
        tw.print();
    })
}
