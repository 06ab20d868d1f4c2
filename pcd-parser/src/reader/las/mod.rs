use std::{io, path::PathBuf};

use las::Reader;
use pcd_core::pointcloud::point::PointRecord;

use super::PointReader;

pub struct LasPointReader {
    pub files: Vec<PathBuf>,
    pub current_file_index: usize,
    pub current_reader: Option<Reader>,
    pub unit_scale: f64,
}

impl LasPointReader {
    pub fn new(files: Vec<PathBuf>, unit_scale: f64) -> io::Result<Self> {
        Ok(Self {
            files,
            current_file_index: 0,
            current_reader: None,
            unit_scale,
        })
    }

    fn open_next_file(&mut self) -> io::Result<()> {
        if self.current_file_index < self.files.len() {
            let file = &self.files[self.current_file_index];
            let reader = Reader::from_path(file).map_err(io::Error::other)?;
            log::debug!(
                "opened {:?} ({} points)",
                file,
                reader.header().number_of_points()
            );
            self.current_reader = Some(reader);
            self.current_file_index += 1;
        } else {
            self.current_reader = None;
        }
        Ok(())
    }

    fn convert_las_point(&self, las_point: las::Point) -> PointRecord {
        PointRecord {
            x: las_point.x * self.unit_scale,
            y: las_point.y * self.unit_scale,
            z: las_point.z * self.unit_scale,
            intensity: las_point.intensity,
            classification: u8::from(las_point.classification),
        }
    }
}

impl PointReader for LasPointReader {
    fn next_point(&mut self) -> io::Result<Option<PointRecord>> {
        loop {
            let next = match self.current_reader.as_mut() {
                Some(reader) => reader.points().next(),
                None => {
                    self.open_next_file()?;
                    if self.current_reader.is_none() {
                        return Ok(None);
                    }
                    continue;
                }
            };

            match next {
                Some(Ok(las_point)) => return Ok(Some(self.convert_las_point(las_point))),
                Some(Err(e)) => {
                    log::error!("Error reading LAS point: {}", e);
                    return Err(io::Error::other(e));
                }
                None => {
                    self.current_reader = None;
                }
            }
        }
    }
}
