use std::path::PathBuf;

use pcd_core::pointcloud::point::PointBatch;

use super::{ParseResult, Parser, ParserProvider, CHUNK_SIZE};
use crate::reader::{las::LasPointReader, PointIterator};

pub struct LasParserProvider {
    pub filenames: Vec<PathBuf>,
    pub unit_scale: f64,
}

impl ParserProvider for LasParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(LasParser {
            filenames: self.filenames.clone(),
            unit_scale: self.unit_scale,
        })
    }
}

pub struct LasParser {
    pub filenames: Vec<PathBuf>,
    pub unit_scale: f64,
}

impl Parser for LasParser {
    fn parse(&self) -> ParseResult<PointBatch> {
        let start = std::time::Instant::now();
        let reader = LasPointReader::new(self.filenames.clone(), self.unit_scale)?;

        let mut points = PointBatch::default();
        for batch in PointIterator::new(reader, CHUNK_SIZE) {
            points.append(batch?);
        }
        log::debug!("read {} LAS points in {:?}", points.len(), start.elapsed());

        Ok(points)
    }
}
