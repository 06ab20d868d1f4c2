use crate::{
    ellipsoid::{grs80, wgs84, Ellipsoid},
    error::Error,
    etmerc::ExtendedTransverseMercatorProjection,
};

pub type EpsgCode = u16;

/// WGS 84 geographic 2D (EPSG:4326)
pub const EPSG_WGS84_GEOGRAPHIC_2D: EpsgCode = 4326;

// WGS 84 / UTM zone 1N .. 60N
pub const EPSG_WGS84_UTM_NORTH_FIRST: EpsgCode = 32601;
pub const EPSG_WGS84_UTM_NORTH_LAST: EpsgCode = 32660;
// WGS 84 / UTM zone 1S .. 60S
pub const EPSG_WGS84_UTM_SOUTH_FIRST: EpsgCode = 32701;
pub const EPSG_WGS84_UTM_SOUTH_LAST: EpsgCode = 32760;
// NAD83 / UTM zone 1N .. 23N
pub const EPSG_NAD83_UTM_FIRST: EpsgCode = 26901;
pub const EPSG_NAD83_UTM_LAST: EpsgCode = 26923;

const UTM_SCALE_FACTOR: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datum {
    Wgs84,
    Nad83,
}

impl Datum {
    pub fn ellipsoid(&self) -> Ellipsoid {
        match self {
            Datum::Wgs84 => wgs84(),
            Datum::Nad83 => grs80(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    pub zone: u8,
    pub north: bool,
    pub datum: Datum,
}

impl UtmZone {
    pub fn from_epsg(epsg: EpsgCode) -> Result<Self, Error> {
        let (zone, north, datum) = match epsg {
            EPSG_WGS84_UTM_NORTH_FIRST..=EPSG_WGS84_UTM_NORTH_LAST => {
                (epsg - EPSG_WGS84_UTM_NORTH_FIRST + 1, true, Datum::Wgs84)
            }
            EPSG_WGS84_UTM_SOUTH_FIRST..=EPSG_WGS84_UTM_SOUTH_LAST => {
                (epsg - EPSG_WGS84_UTM_SOUTH_FIRST + 1, false, Datum::Wgs84)
            }
            EPSG_NAD83_UTM_FIRST..=EPSG_NAD83_UTM_LAST => {
                (epsg - EPSG_NAD83_UTM_FIRST + 1, true, Datum::Nad83)
            }
            _ => return Err(Error::UnsupportedCrs(epsg)),
        };
        Ok(Self {
            zone: zone as u8,
            north,
            datum,
        })
    }

    pub fn epsg(&self) -> EpsgCode {
        let zone = self.zone as EpsgCode;
        match (self.datum, self.north) {
            (Datum::Wgs84, true) => EPSG_WGS84_UTM_NORTH_FIRST + zone - 1,
            (Datum::Wgs84, false) => EPSG_WGS84_UTM_SOUTH_FIRST + zone - 1,
            (Datum::Nad83, _) => EPSG_NAD83_UTM_FIRST + zone - 1,
        }
    }

    /// Longitude of the zone's central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        -183.0 + 6.0 * self.zone as f64
    }

    pub fn projection(&self) -> ExtendedTransverseMercatorProjection {
        let false_northing = if self.north {
            0.0
        } else {
            UTM_FALSE_NORTHING_SOUTH
        };
        ExtendedTransverseMercatorProjection::new(
            self.central_meridian(),
            0.0,
            UTM_SCALE_FACTOR,
            UTM_FALSE_EASTING,
            false_northing,
            self.datum.ellipsoid(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_lookup() {
        let z = UtmZone::from_epsg(32633).unwrap();
        assert_eq!(z.zone, 33);
        assert!(z.north);
        assert_eq!(z.central_meridian(), 15.0);
        assert_eq!(z.epsg(), 32633);

        let z = UtmZone::from_epsg(32701).unwrap();
        assert_eq!(z.zone, 1);
        assert!(!z.north);
        assert_eq!(z.central_meridian(), -177.0);

        let z = UtmZone::from_epsg(26910).unwrap();
        assert_eq!(z.datum, Datum::Nad83);
        assert_eq!(z.central_meridian(), -123.0);
        assert_eq!(z.epsg(), 26910);
    }

    #[test]
    fn unsupported_codes_are_rejected() {
        assert_eq!(
            UtmZone::from_epsg(EPSG_WGS84_GEOGRAPHIC_2D),
            Err(Error::UnsupportedCrs(4326))
        );
        assert!(UtmZone::from_epsg(32661).is_err());
        assert!(UtmZone::from_epsg(26924).is_err());
    }
}
