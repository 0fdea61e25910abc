//! JSON persistence of fitted artifacts

use crate::error::Result;
use crate::table::StagedOutputs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut outputs = StagedOutputs::new();
    stage_json(&mut outputs, path, value)?;
    outputs.commit()
}

/// Stage a JSON artifact; nothing reaches `path` until the batch is committed
pub fn stage_json<T: Serialize>(outputs: &mut StagedOutputs, path: &Path, value: &T) -> Result<()> {
    outputs.stage(path, |out| {
        serde_json::to_writer_pretty(&mut *out, value)?;
        Ok(())
    })
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
