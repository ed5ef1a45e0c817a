use crate::codec::JobCodec;
use crate::domain::model::{RedactionJob, RedactionMode, Region};
use crate::utils::error::{RedactorError, Result};
use crate::utils::validation::{validate_path, Validate};
use std::path::Path;

/// Editing state of the presentation layer: at most one open job.
#[derive(Debug, Default)]
pub struct EditorSession {
    job: Option<RedactionJob>,
}

fn no_job() -> RedactorError {
    RedactorError::ValidationError {
        message: "No image is open".to_string(),
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.job.is_some()
    }

    /// Starts a new job for `path`, dropping any job already open.
    pub fn open_image(&mut self, path: &str) -> Result<&RedactionJob> {
        validate_path("source_image_path", path)?;
        if let Some(previous) = &self.job {
            tracing::debug!("Discarding job for {}", previous.source_image_path);
        }
        tracing::info!("🖼️ Opened {}", path);
        Ok(self.job.insert(RedactionJob::new(path, RedactionMode::default())))
    }

    pub fn job(&self) -> Result<&RedactionJob> {
        self.job.as_ref().ok_or_else(no_job)
    }

    fn job_mut(&mut self) -> Result<&mut RedactionJob> {
        self.job.as_mut().ok_or_else(no_job)
    }

    /// Appends a region and returns its index.
    pub fn add_region(&mut self, region: Region) -> Result<usize> {
        check_region(&region)?;
        let job = self.job_mut()?;
        job.regions.push(region);
        Ok(job.regions.len() - 1)
    }

    pub fn update_region(&mut self, index: usize, region: Region) -> Result<()> {
        check_region(&region)?;
        let job = self.job_mut()?;
        let slot = job
            .regions
            .get_mut(index)
            .ok_or_else(|| region_out_of_range(index))?;
        *slot = region;
        Ok(())
    }

    pub fn remove_region(&mut self, index: usize) -> Result<Region> {
        let job = self.job_mut()?;
        if index >= job.regions.len() {
            return Err(region_out_of_range(index));
        }
        Ok(job.regions.remove(index))
    }

    pub fn set_mode(&mut self, mode: RedactionMode) -> Result<()> {
        mode.validate()?;
        self.job_mut()?.mode = mode;
        Ok(())
    }

    pub fn set_output(&mut self, output_path: Option<String>) -> Result<()> {
        if let Some(path) = &output_path {
            validate_path("output_path", path)?;
        }
        self.job_mut()?.output_path = output_path;
        Ok(())
    }

    pub fn save_job<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let job = self.job()?;
        job.validate()?;
        std::fs::write(path.as_ref(), JobCodec::encode_job(job)?)?;
        tracing::info!("💾 Job saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Replaces the open job with one read from `path`.
    pub fn load_job<P: AsRef<Path>>(&mut self, path: P) -> Result<&RedactionJob> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let job = JobCodec::decode_job(&text)?;
        tracing::info!(
            "📂 Loaded job for {} with {} region(s)",
            job.source_image_path,
            job.regions.len()
        );
        Ok(self.job.insert(job))
    }

    pub fn discard(&mut self) -> Option<RedactionJob> {
        self.job.take()
    }
}

fn check_region(region: &Region) -> Result<()> {
    if region.width == 0 || region.height == 0 {
        return Err(RedactorError::InvalidConfigValueError {
            field: "region".to_string(),
            value: format!(
                "{},{},{},{}",
                region.x, region.y, region.width, region.height
            ),
            reason: "Region width and height must be greater than 0".to_string(),
        });
    }
    Ok(())
}

fn region_out_of_range(index: usize) -> RedactorError {
    RedactorError::ValidationError {
        message: format!("Region {} does not exist", index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_operations_need_an_open_image() {
        let mut session = EditorSession::new();
        assert!(session.job().is_err());
        assert!(session.add_region(Region::new(0, 0, 1, 1)).is_err());
        assert!(session.set_mode(RedactionMode::default()).is_err());
        assert!(session.discard().is_none());
    }

    #[test]
    fn test_region_editing() {
        let mut session = EditorSession::new();
        session.open_image("photo.png").unwrap();

        assert_eq!(session.add_region(Region::new(0, 0, 10, 10)).unwrap(), 0);
        assert_eq!(session.add_region(Region::new(5, 5, 2, 2)).unwrap(), 1);
        session.update_region(0, Region::new(1, 1, 3, 3)).unwrap();
        assert!(session.update_region(7, Region::new(1, 1, 3, 3)).is_err());
        assert!(session.add_region(Region::new(0, 0, 0, 4)).is_err());

        assert_eq!(session.remove_region(1).unwrap(), Region::new(5, 5, 2, 2));
        assert_eq!(session.job().unwrap().regions, vec![Region::new(1, 1, 3, 3)]);
    }

    #[test]
    fn test_invalid_mode_keeps_previous() {
        let mut session = EditorSession::new();
        session.open_image("photo.png").unwrap();
        session.set_mode(RedactionMode::Blur { sigma: 3.0 }).unwrap();

        assert!(session.set_mode(RedactionMode::Blur { sigma: 0.0 }).is_err());
        assert_eq!(session.job().unwrap().mode, RedactionMode::Blur { sigma: 3.0 });
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job.json");

        let mut session = EditorSession::new();
        session.open_image("photo.png").unwrap();
        session.add_region(Region::new(2, 2, 8, 8)).unwrap();
        session.set_output(Some("clean.png".to_string())).unwrap();
        session.save_job(&path).unwrap();
        let saved = session.discard().unwrap();

        assert!(!session.is_open());
        assert_eq!(session.load_job(&path).unwrap(), &saved);
    }
}
