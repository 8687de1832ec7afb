use std::path::Path;

use annostream::annotated::SEPARATOR;
use anyhow::Context;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{enter_scope, open_reader, ValueInfo},
    output::print_output,
};

#[derive(Debug, Serialize)]
pub struct GetResult {
    pub key: String,
    pub r#type: String,
    pub value: ValueInfo,
    #[serde(skip)]
    pub display: String,
}

pub fn run(path: &Path, key: &str, opts: &GlobalOptions) -> anyhow::Result<()> {
    let mut reader = open_reader(path)?;

    let name = match key.rsplit_once(SEPARATOR) {
        Some((scope, name)) => {
            enter_scope(&mut reader, scope)?;
            name
        }
        None => key,
    };

    let value = reader
        .get_value(name)
        .with_context(|| format!("failed to read key: {key}"))?
        .with_context(|| format!("key not found: {key}"))?;

    let result = GetResult {
        key: key.to_string(),
        r#type: value.tag().to_string(),
        value: ValueInfo::from(&value),
        display: value.to_string(),
    };

    print_output(&result, opts, |result| println!("{}", result.display))
}
