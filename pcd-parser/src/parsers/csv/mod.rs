use std::path::PathBuf;

use pcd_core::pointcloud::point::PointBatch;

use super::{ParseResult, Parser, ParserProvider, CHUNK_SIZE};
use crate::reader::{csv::CsvPointReader, PointIterator};

pub struct CsvParserProvider {
    pub filenames: Vec<PathBuf>,
    pub delimiter: u8,
    pub unit_scale: f64,
}

impl ParserProvider for CsvParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(CsvParser {
            filenames: self.filenames.clone(),
            delimiter: self.delimiter,
            unit_scale: self.unit_scale,
        })
    }
}

pub struct CsvParser {
    pub filenames: Vec<PathBuf>,
    pub delimiter: u8,
    pub unit_scale: f64,
}

impl Parser for CsvParser {
    fn parse(&self) -> ParseResult<PointBatch> {
        let start = std::time::Instant::now();
        let reader = CsvPointReader::new(self.filenames.clone(), self.delimiter, self.unit_scale)?;

        let mut points = PointBatch::default();
        for batch in PointIterator::new(reader, CHUNK_SIZE) {
            points.append(batch?);
        }
        log::debug!("read {} CSV points in {:?}", points.len(), start.elapsed());

        Ok(points)
    }
}
