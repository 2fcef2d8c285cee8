use crate::{
    telemetry::{NoTelemetry, Telemetry},
    Descriptor, Error, Result,
};

static NO_TELEMETRY: NoTelemetry = NoTelemetry;

/// Resource limits checked against the descriptor before any pixel work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Limits {
    /// Maximum number of pixels (width × height).
    pub max_pixels: Option<u64>,
}

impl Limits {
    /// No limits.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = Some(max_pixels);
        self
    }

    pub fn check(&self, descriptor: &Descriptor) -> Result<()> {
        let pixels = descriptor.width as u64 * descriptor.height as u64;

        match self.max_pixels {
            Some(max_pixels) if pixels > max_pixels => {
                Err(Error::LimitExceeded { pixels, max_pixels })
            }
            _ => Ok(()),
        }
    }
}

/// Options shared by encoding and decoding.
#[derive(Clone, Copy)]
pub struct Settings<'a> {
    /// Encode tile rows on the rayon thread pool.
    ///
    /// Has no effect without the `parallel` feature, or when decoding.
    pub parallel: bool,
    pub limits: Limits,
    pub telemetry: &'a dyn Telemetry,
}

impl Default for Settings<'static> {
    fn default() -> Self {
        Self {
            parallel: cfg!(feature = "parallel"),
            limits: Limits::none(),
            telemetry: &NO_TELEMETRY,
        }
    }
}

impl<'a> Settings<'a> {
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_telemetry<'b>(self, telemetry: &'b dyn Telemetry) -> Settings<'b> {
        Settings {
            parallel: self.parallel,
            limits: self.limits,
            telemetry,
        }
    }
}
