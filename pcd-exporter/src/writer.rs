use std::{
    error::Error,
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use byteorder::{ByteOrder as _, LittleEndian, ReadBytesExt as _, WriteBytesExt as _};
use pcd_core::grid::Grid;

use crate::bundle::GridBundle;

pub type ExportResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

fn create(path: &Path) -> ExportResult<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

pub fn write_json(bundle: &GridBundle, path: &Path) -> ExportResult<()> {
    let mut writer = create(path)?;
    serde_json::to_writer(&mut writer, bundle)?;
    writer.flush()?;
    log::info!("write bundle: {:?}", path);
    Ok(())
}

pub fn read_json(path: &Path) -> ExportResult<GridBundle> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn write_bitcode(bundle: &GridBundle, path: &Path) -> ExportResult<()> {
    let bytes = bitcode::encode(bundle);
    let mut writer = create(path)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    log::info!("write bundle: {:?} ({} bytes)", path, bytes.len());
    Ok(())
}

pub fn read_bitcode(path: &Path) -> ExportResult<GridBundle> {
    let bytes = fs::read(path)?;
    Ok(bitcode::decode(&bytes)?)
}

/// Little-endian dump: `rows: u32`, `cols: u32`, `scale: f64`, then
/// `rows * cols` `f32` values, row 0 first. Empty cells are written as NaN.
pub fn write_raw_grid(grid: &Grid, path: &Path) -> ExportResult<()> {
    let mut writer = create(path)?;
    writer.write_u32::<LittleEndian>(u32::try_from(grid.rows())?)?;
    writer.write_u32::<LittleEndian>(u32::try_from(grid.cols())?)?;
    writer.write_f64::<LittleEndian>(grid.scale())?;
    for v in grid.data() {
        writer.write_f32::<LittleEndian>(*v as f32)?;
    }
    writer.flush()?;
    log::info!("write raw grid: {:?}", path);
    Ok(())
}

pub fn read_raw_grid(path: &Path) -> ExportResult<Grid> {
    let mut reader = BufReader::new(File::open(path)?);
    let rows = reader.read_u32::<LittleEndian>()? as usize;
    let cols = reader.read_u32::<LittleEndian>()? as usize;
    let scale = reader.read_f64::<LittleEndian>()?;

    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    if bytes.len() != rows * cols * 4 {
        return Err(format!("expected {} grid values, found {} bytes", rows * cols, bytes.len()).into());
    }
    let mut values = vec![0f32; rows * cols];
    LittleEndian::read_f32_into(&bytes, &mut values);
    Ok(Grid::from_vec(rows, cols, scale, values.into_iter().map(f64::from).collect())?)
}
