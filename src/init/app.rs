use std::path::Path;

use super::json;
use crate::simulation::Bounds;
use crate::App;

impl App {
    pub fn try_from_file<P: AsRef<Path>>(
        settings_file_path: P,
        bounds: Bounds,
    ) -> Result<Self, String> {
        let settings = json::parse_settings(settings_file_path).map_err(|e| e.to_string())?;
        Self::try_new(bounds, settings)
    }
}
