use std::{collections::HashMap, error::Error, fs::File, io, path::PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use pcd_core::pointcloud::point::PointRecord;

use super::PointReader;

// Column order assumed for files without a header row
const ATTRIBUTE_NAMES: [&str; 5] = ["x", "y", "z", "intensity", "classification"];

fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace(['_', '-', ' '], "")
}

fn create_field_mapping(
    headers: &StringRecord,
    has_headers: bool,
) -> Result<HashMap<&'static str, usize>, Box<dyn Error + Send + Sync>> {
    let mut mapping = HashMap::new();

    if has_headers {
        for (index, header) in headers.iter().enumerate() {
            let normalized_header = normalize(header);
            for attr_name in ATTRIBUTE_NAMES {
                if normalized_header == normalize(attr_name) {
                    mapping.insert(attr_name, index);
                    break;
                }
            }
        }
    } else {
        for (index, attr_name) in ATTRIBUTE_NAMES.iter().enumerate().take(headers.len()) {
            mapping.insert(*attr_name, index);
        }
    }

    for attr_name in ["x", "y", "z"] {
        if !mapping.contains_key(attr_name) {
            return Err(format!(
                "Required attribute '{}' is missing in CSV headers or mapping.",
                attr_name
            )
            .into());
        }
    }

    Ok(mapping)
}

fn get_field_value<'a>(
    record: &'a StringRecord,
    field_mapping: &HashMap<&'static str, usize>,
    field_name: &str,
) -> Option<&'a str> {
    field_mapping
        .get(field_name)
        .and_then(|&index| record.get(index))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

// A header row made only of numbers is the first data row of a headerless file
fn looks_like_data(headers: &StringRecord) -> bool {
    !headers.is_empty() && headers.iter().all(|h| h.trim().parse::<f64>().is_ok())
}

pub struct CsvPointReader {
    pub files: Vec<PathBuf>,
    pub current_file_index: usize,
    pub current_reader: Option<csv::Reader<File>>,
    pub field_mapping: HashMap<&'static str, usize>,
    pub delimiter: u8,
    pub unit_scale: f64,
    pending: Option<StringRecord>,
}

impl CsvPointReader {
    pub fn new(files: Vec<PathBuf>, delimiter: u8, unit_scale: f64) -> io::Result<Self> {
        let mut reader = CsvPointReader {
            files,
            current_file_index: 0,
            current_reader: None,
            field_mapping: HashMap::new(),
            delimiter,
            unit_scale,
            pending: None,
        };

        reader.open_next_file()?;
        Ok(reader)
    }

    fn open_next_file(&mut self) -> io::Result<()> {
        if self.current_file_index < self.files.len() {
            let path = &self.files[self.current_file_index];
            self.current_file_index += 1;

            let mut rdr = ReaderBuilder::new()
                .has_headers(true)
                .delimiter(self.delimiter)
                .trim(Trim::All)
                .flexible(true)
                .from_path(path)?;

            let headers = rdr.headers()?.clone();
            let has_headers = !looks_like_data(&headers);

            let mapping = create_field_mapping(&headers, has_headers).map_err(io::Error::other)?;

            self.field_mapping = mapping;
            self.pending = if has_headers { None } else { Some(headers) };
            self.current_reader = Some(rdr);
        } else {
            self.current_reader = None;
        }
        Ok(())
    }

    fn parse_point(&self, record: &StringRecord) -> Result<PointRecord, Box<dyn Error + Send + Sync>> {
        let x: f64 = get_field_value(record, &self.field_mapping, "x")
            .ok_or("Missing 'x' field")?
            .parse()?;
        let y: f64 = get_field_value(record, &self.field_mapping, "y")
            .ok_or("Missing 'y' field")?
            .parse()?;
        let z: f64 = get_field_value(record, &self.field_mapping, "z")
            .ok_or("Missing 'z' field")?
            .parse()?;

        let intensity = match get_field_value(record, &self.field_mapping, "intensity") {
            Some(v) => v.parse::<f64>()?.clamp(0.0, u16::MAX as f64) as u16,
            None => 0,
        };
        let classification = match get_field_value(record, &self.field_mapping, "classification") {
            Some(v) => v.parse::<u8>()?,
            None => 0,
        };

        Ok(PointRecord {
            x: x * self.unit_scale,
            y: y * self.unit_scale,
            z: z * self.unit_scale,
            intensity,
            classification,
        })
    }
}

impl PointReader for CsvPointReader {
    fn next_point(&mut self) -> io::Result<Option<PointRecord>> {
        loop {
            if let Some(record) = self.pending.take() {
                return self.parse_point(&record).map(Some).map_err(io::Error::other);
            }

            let Some(reader) = self.current_reader.as_mut() else {
                return Ok(None);
            };
            let mut record = StringRecord::new();

            match reader.read_record(&mut record) {
                Ok(true) => match self.parse_point(&record) {
                    Ok(p) => return Ok(Some(p)),
                    Err(e) => {
                        log::error!("Error parsing CSV point: {}", e);
                        return Err(io::Error::other(format!("{}", e)));
                    }
                },
                Ok(false) => {
                    self.open_next_file()?;
                }
                Err(e) => {
                    log::error!("Error reading CSV record: {}", e);
                    return Err(io::Error::other(e));
                }
            }
        }
    }
}
