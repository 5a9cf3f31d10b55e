use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Directory holding one document per origin.
    pub root: PathBuf,
    /// Origin scope of this store. Two components on pages from different
    /// origins must never observe each other's segments.
    pub origin: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_store_dir(),
            origin: "https://frames.adweave.example".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn document_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", sanitize(&self.origin)))
    }
}

fn default_store_dir() -> PathBuf {
    match env::var("ADWEAVE_STORE_DIR") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => PathBuf::from(".adweave/store"),
    }
}

fn sanitize(origin: &str) -> String {
    origin
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_path_is_origin_scoped() {
        let a = StoreConfig {
            root: PathBuf::from("/tmp/store"),
            origin: "https://frames.adweave.example".into(),
        };
        let b = StoreConfig {
            root: PathBuf::from("/tmp/store"),
            origin: "https://other.example".into(),
        };
        assert_ne!(a.document_path(), b.document_path());
        assert!(a
            .document_path()
            .to_string_lossy()
            .ends_with("https___frames.adweave.example.json"));
    }
}
