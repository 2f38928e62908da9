//! Writers for history, results, velocity fields and checkpoints.

use anyhow::{Context, Result};
use hemoflow_common::{Checkpoint, SimulationResult, VelocityField, NR, NZ};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Serialization formats accepted in `output.format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Bincode,
    MessagePack,
}

impl OutputFormat {
    /// Parses the config value, falling back to JSON for unknown names.
    pub fn from_config(format: Option<&str>) -> Self {
        match format.unwrap_or("json") {
            "json" => OutputFormat::Json,
            "bincode" => OutputFormat::Bincode,
            "messagepack" => OutputFormat::MessagePack,
            other => {
                warn!("Unknown output format: {}. Using JSON instead.", other);
                OutputFormat::Json
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Bincode => "bin",
            OutputFormat::MessagePack => "msgpack",
        }
    }
}

/// Serializes `value` into `writer` using `format`.
pub fn write_to<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => serde_json::to_writer(&mut writer, value).context("Error serializing to JSON")?,
        OutputFormat::Bincode => bincode::serialize_into(&mut writer, value).context("Error serializing to bincode")?,
        OutputFormat::MessagePack => {
            rmp_serde::encode::write(&mut writer, value).context("Error serializing to MessagePack")?
        }
    }
    writer.flush()?;
    Ok(())
}

/// Deserializes a value previously written with `write_to`.
pub fn read_from<R: Read, T: DeserializeOwned>(reader: R, format: OutputFormat) -> Result<T> {
    let value = match format {
        OutputFormat::Json => serde_json::from_reader(reader).context("Error parsing JSON")?,
        OutputFormat::Bincode => bincode::deserialize_from(reader).context("Error parsing bincode")?,
        OutputFormat::MessagePack => rmp_serde::decode::from_read(reader).context("Error parsing MessagePack")?,
    };
    Ok(value)
}

/// Writes `value` to `<base>_<suffix>.<ext>` and returns the path.
pub fn save<T: Serialize + ?Sized>(base_filename: &str, suffix: &str, value: &T, format: OutputFormat) -> Result<PathBuf> {
    let path = PathBuf::from(format!("{}_{}.{}", base_filename, suffix, format.extension()));
    let file = File::create(&path).with_context(|| format!("Error creating file '{}'", path.display()))?;
    write_to(BufWriter::new(file), value, format)
        .with_context(|| format!("Error writing '{}'", path.display()))?;
    Ok(path)
}

pub fn save_result(base_filename: &str, result: &SimulationResult) -> Result<PathBuf> {
    let path = PathBuf::from(format!("{}_result.json", base_filename));
    let file = File::create(&path).with_context(|| format!("Error creating file '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), result)
        .with_context(|| format!("Error writing '{}'", path.display()))?;
    info!("Latest result saved to {}", path.display());
    Ok(path)
}

/// Writes the field as CSV rows `i,j,r_norm,z_norm,velocity`.
pub fn write_field_csv<W: Write>(writer: W, field: &VelocityField) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["i", "j", "r_norm", "z_norm", "velocity"])?;
    for j in 0..NZ {
        for i in 0..NR {
            csv_writer.write_record(&[
                i.to_string(),
                j.to_string(),
                format!("{:.4}", i as f64 / (NR - 1) as f64),
                format!("{:.4}", j as f64 / (NZ - 1) as f64),
                format!("{:.6e}", field.get(i, j)),
            ])?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn save_field_csv(base_filename: &str, field: &VelocityField) -> Result<PathBuf> {
    let path = PathBuf::from(format!("{}_field.csv", base_filename));
    let file = File::create(&path).with_context(|| format!("Error creating file '{}'", path.display()))?;
    write_field_csv(BufWriter::new(file), field)?;
    info!("Final velocity field saved to {}", path.display());
    Ok(path)
}

/// Checkpoints always use bincode so floats round-trip bit for bit.
pub fn save_checkpoint<P: AsRef<Path>>(path: P, checkpoint: &Checkpoint) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Error creating checkpoint '{}'", path.display()))?;
    write_to(BufWriter::new(file), checkpoint, OutputFormat::Bincode)?;
    info!("Checkpoint saved to {} (t = {:.3} s)", path.display(), checkpoint.time);
    Ok(())
}

pub fn load_checkpoint<P: AsRef<Path>>(path: P) -> Result<Checkpoint> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Error opening checkpoint '{}'", path.display()))?;
    read_from(BufReader::new(file), OutputFormat::Bincode)
        .with_context(|| format!("Error reading checkpoint '{}'", path.display()))
}
