use std::{
    error::Error,
    ffi::OsStr,
    path::{Path, PathBuf},
};

use pcd_core::pointcloud::point::PointBatch;
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};

pub mod csv;
pub mod las;

pub type ParseResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// Points per batch when streaming a file
pub const CHUNK_SIZE: usize = 1_000_000;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser: Send + Sync {
    fn parse(&self) -> ParseResult<PointBatch>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Las,
    Laz,
    Csv,
    Txt,
}

pub fn get_extension(extension: &str) -> ParseResult<Extension> {
    match extension.to_lowercase().as_str() {
        "las" => Ok(Extension::Las),
        "laz" => Ok(Extension::Laz),
        "csv" => Ok(Extension::Csv),
        "txt" => Ok(Extension::Txt),
        other => Err(format!("Unsupported extension: {}", other).into()),
    }
}

pub fn extension_of(path: &Path) -> ParseResult<Extension> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .ok_or_else(|| format!("File extension is not found: {:?}", path))?;
    get_extension(extension)
}

pub fn provider_for(path: &Path, unit_scale: f64) -> ParseResult<Box<dyn ParserProvider>> {
    let filenames = vec![path.to_path_buf()];
    let provider: Box<dyn ParserProvider> = match extension_of(path)? {
        Extension::Las | Extension::Laz => Box::new(las::LasParserProvider {
            filenames,
            unit_scale,
        }),
        Extension::Csv => Box::new(csv::CsvParserProvider {
            filenames,
            delimiter: b',',
            unit_scale,
        }),
        Extension::Txt => Box::new(csv::CsvParserProvider {
            filenames,
            delimiter: b' ',
            unit_scale,
        }),
    };
    Ok(provider)
}

/// Parses every file on the rayon pool. Batches come back in input order so
/// that accumulation downstream sees the files' natural point order.
pub fn parse_files(paths: &[PathBuf], unit_scale: f64) -> ParseResult<Vec<PointBatch>> {
    paths
        .par_iter()
        .map(|path| {
            let batch = provider_for(path, unit_scale)?.get_parser().parse()?;
            log::debug!("parsed {} points from {:?}", batch.len(), path);
            Ok(batch)
        })
        .collect()
}
