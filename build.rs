use anyhow::Result;
use vergen::EmitBuilder;

// Short sha and commit date feed the CLI's long version string.
fn main() -> Result<()> {
    EmitBuilder::builder()
        .git_sha(true)
        .git_commit_date()
        .emit()?;
    Ok(())
}
