//! Derived-result series files: `{x: [...], y: [...]}` per metric and parameter.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::SeriesFile;
use crate::{ResultsError, ResultsResult};

#[derive(Clone)]
pub struct SeriesStore {
    dir: PathBuf,
}

impl SeriesStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<metric>_<param>.json`
    pub fn path(&self, metric: &str, param: &str) -> ResultsResult<PathBuf> {
        for part in [metric, param] {
            let bad = part.is_empty()
                || part
                    .chars()
                    .any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
                || part.starts_with('.');
            if bad {
                return Err(ResultsError::InvalidSeriesName(part.to_string()));
            }
        }
        Ok(self.dir.join(format!("{}_{}.json", metric, param)))
    }

    pub fn write_series(
        &self,
        metric: &str,
        param: &str,
        series: &SeriesFile,
    ) -> ResultsResult<PathBuf> {
        if series.x.len() != series.y.len() {
            return Err(ResultsError::SeriesShape {
                metric: metric.to_string(),
                x_len: series.x.len(),
                y_len: series.y.len(),
            });
        }
        let path = self.path(metric, param)?;
        fs::create_dir_all(&self.dir)?;
        crate::store::write_atomic(&path, serde_json::to_string(series)?.as_bytes())?;
        Ok(path)
    }

    pub fn read_series(&self, metric: &str, param: &str) -> ResultsResult<SeriesFile> {
        let path = self.path(metric, param)?;
        if !path.exists() {
            return Err(ResultsError::MissingInput { path });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_like_names() {
        let store = SeriesStore::new(PathBuf::from("series"));
        assert!(store.path("throughput", "254").is_ok());
        assert!(store.path("../throughput", "254").is_err());
        assert!(store.path("throughput", "").is_err());
        assert!(store.path("a/b", "1").is_err());
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let store = SeriesStore::new(std::env::temp_dir().join("lt_series_shape"));
        let series = SeriesFile {
            x: vec![1.0, 2.0],
            y: vec![1.0],
        };
        assert!(matches!(
            store.write_series("nec", "all", &series),
            Err(ResultsError::SeriesShape { .. })
        ));
    }
}
