#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    a: f64,
    f: f64,
}

impl Ellipsoid {
    pub const fn new(a: f64, inv_f: f64) -> Self {
        Self { a, f: 1.0 / inv_f }
    }

    /// Semi-major axis in meters.
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Flattening.
    pub fn f(&self) -> f64 {
        self.f
    }

    /// First eccentricity.
    pub fn e(&self) -> f64 {
        (self.f * (2.0 - self.f)).sqrt()
    }

    /// Third flattening.
    pub fn n(&self) -> f64 {
        self.f / (2.0 - self.f)
    }
}

pub const fn wgs84() -> Ellipsoid {
    Ellipsoid::new(6_378_137.0, 298.257223563)
}

pub const fn grs80() -> Ellipsoid {
    Ellipsoid::new(6_378_137.0, 298.257222101)
}
