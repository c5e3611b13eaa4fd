//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Blog;

/// Remove the public directory, including pages rendered on demand
pub fn run(blog: &Blog) -> Result<()> {
    if blog.public_dir.exists() {
        fs::remove_dir_all(&blog.public_dir)?;
        tracing::info!("Deleted: {:?}", blog.public_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_public_dir() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        fs::create_dir_all(blog.public_dir.join("post/hello")).unwrap();
        fs::write(blog.public_dir.join("index.html"), "<html></html>").unwrap();

        run(&blog).unwrap();
        assert!(!blog.public_dir.exists());

        // Nothing to clean is fine
        run(&blog).unwrap();
    }
}
