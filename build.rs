use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // falls back to placeholder values when git is unavailable
    EmitBuilder::builder()
        .cargo_opt_level()
        .git_sha(true)
        .emit()?;
    Ok(())
}
