use std::fmt::Debug;

use pcd_core::Result;
use projection_transform::{
    crs::{EpsgCode, UtmZone},
    etmerc::ExtendedTransverseMercatorProjection,
};

use crate::error::ProjectionError;

/// Forward/inverse mapping between geographic degrees and a projected CRS.
pub trait Projection: Debug + Send + Sync {
    /// Identity of the CRS; two projections with the same name are the same CRS.
    fn name(&self) -> String;

    /// (lon, lat) in degrees to (easting, northing).
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)>;

    /// (easting, northing) to (lon, lat) in degrees.
    fn inverse(&self, easting: f64, northing: f64) -> Result<(f64, f64)>;

    fn same_crs(&self, other: &dyn Projection) -> bool {
        self.name() == other.name()
    }
}

#[derive(Debug, Clone)]
pub struct UtmProjection {
    zone: UtmZone,
    etmerc: ExtendedTransverseMercatorProjection,
}

impl UtmProjection {
    pub fn from_epsg(epsg: EpsgCode) -> Result<Self> {
        let zone = UtmZone::from_epsg(epsg).map_err(|source| ProjectionError {
            epsg,
            context: "lookup",
            source,
        })?;
        Ok(Self {
            zone,
            etmerc: zone.projection(),
        })
    }

    pub fn epsg(&self) -> EpsgCode {
        self.zone.epsg()
    }

    pub fn zone(&self) -> &UtmZone {
        &self.zone
    }
}

impl Projection for UtmProjection {
    fn name(&self) -> String {
        format!("EPSG:{}", self.zone.epsg())
    }

    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let (e, n, _) = self
            .etmerc
            .project_forward(lon, lat, 0.0)
            .map_err(|source| ProjectionError {
                epsg: self.epsg(),
                context: "forward",
                source,
            })?;
        Ok((e, n))
    }

    fn inverse(&self, easting: f64, northing: f64) -> Result<(f64, f64)> {
        let (lon, lat, _) = self
            .etmerc
            .project_inverse(easting, northing, 0.0)
            .map_err(|source| ProjectionError {
                epsg: self.epsg(),
                context: "inverse",
                source,
            })?;
        Ok((lon, lat))
    }
}
