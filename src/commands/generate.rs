//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Blog;

/// Generate the static site from the configured content store
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let store = blog.store()?;
    let generator = Generator::new(blog)?;
    generator.generate(store.as_ref()).await?;

    tracing::info!(
        "Generated {:?} in {:.2}s",
        blog.public_dir,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
